//! Prometheus text exposition format.
//!
//! Renders observations into the Prometheus text exposition format
//! for scraping by a Prometheus server or compatible agent.

use crate::schema::Observation;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render observations into Prometheus text format.
///
/// Each metric family gets one HELP/TYPE header, placed before its first
/// sample. Families keep the order in which they first appear.
pub fn render_prometheus(observations: &[Observation<'_>]) -> String {
    let mut families: Vec<(&str, Vec<&Observation<'_>>)> = Vec::new();
    for obs in observations {
        match families.iter().position(|(name, _)| *name == obs.name()) {
            Some(idx) => families[idx].1.push(obs),
            None => families.push((obs.name(), vec![obs])),
        }
    }

    let mut out = String::new();
    for (name, samples) in families {
        let desc = samples[0].desc;
        out.push_str(&format!("# HELP {name} {}\n", escape_help(desc.help)));
        out.push_str(&format!("# TYPE {name} {}\n", desc.kind.as_str()));
        for s in samples {
            out.push_str(name);
            if !s.label_values.is_empty() {
                let labels: Vec<String> = s
                    .labels()
                    .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
                    .collect();
                out.push_str(&format!("{{{}}}", labels.join(",")));
            }
            out.push_str(&format!(" {}\n", format_value(s.value)));
        }
    }
    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn render_empty() {
        assert_eq!(render_prometheus(&[]), "");
    }

    #[test]
    fn render_unlabeled_gauge() {
        let schema = Schema::new();
        let output = render_prometheus(&[Observation::unlabeled(&schema.db_size, 1_073_741_824.0)]);
        assert_eq!(
            output,
            "# HELP nextcloud_db_size_bytes Database size in bytes.\n\
             # TYPE nextcloud_db_size_bytes gauge\n\
             nextcloud_db_size_bytes 1073741824\n"
        );
    }

    #[test]
    fn render_labeled_family_has_single_header() {
        let schema = Schema::new();
        let obs = vec![
            Observation::new(&schema.requests, vec!["ok".to_string()], 12.0),
            Observation::new(&schema.requests, vec!["ko".to_string()], 1.0),
        ];
        let output = render_prometheus(&obs);

        assert_eq!(output.matches("# TYPE nextcloud_requests counter").count(), 1);
        assert!(output.contains("nextcloud_requests{status=\"ok\"} 12\n"));
        assert!(output.contains("nextcloud_requests{status=\"ko\"} 1\n"));
    }

    #[test]
    fn render_groups_interleaved_families() {
        let schema = Schema::new();
        let obs = vec![
            Observation::new(&schema.shares, vec!["user".to_string()], 1.0),
            Observation::unlabeled(&schema.result_ok, 1.0),
            Observation::new(&schema.shares, vec!["mail".to_string()], 2.0),
        ];
        let output = render_prometheus(&obs);

        assert_eq!(output.matches("# HELP nextcloud_shares_total").count(), 1);
        let mail = output.find("type=\"mail\"").unwrap();
        let result = output.find("nextcloud_result_ok 1").unwrap();
        assert!(mail < result, "shares samples should stay together:\n{output}");
    }

    #[test]
    fn render_escapes_label_values() {
        let schema = Schema::new();
        let obs = Observation::new(
            &schema.system_info,
            vec![
                "28.0.1".to_string(),
                "8.2".to_string(),
                "Apache \"custom\"\\build".to_string(),
                "sqlite3".to_string(),
                "3.40\nbeta".to_string(),
            ],
            1.0,
        );
        let output = render_prometheus(&[obs]);
        assert!(output.contains(r#"webserver="Apache \"custom\"\\build""#), "{output}");
        assert!(output.contains(r#"database_version="3.40\nbeta""#), "{output}");
    }

    #[test]
    fn render_special_values() {
        assert_eq!(format_value(-1.0), "-1");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let schema = Schema::new();
        let obs = vec![
            Observation::unlabeled(&schema.free_space, 42.0),
            Observation::new(&schema.fed_shares, vec!["sent".to_string()], 3.0),
        ];
        let output = render_prometheus(&obs);

        // Every non-comment line should be: metric_name[{labels}] value
        for line in output.lines() {
            if line.starts_with('#') {
                continue;
            }
            let (series, value) = line.rsplit_once(' ').unwrap();
            assert!(series.starts_with("nextcloud_"), "line: {line}");
            assert!(value.parse::<f64>().is_ok(), "line: {line}");
        }
    }
}
