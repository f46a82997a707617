//! Snapshot → observations.

use nc_core::Snapshot;

use crate::schema::{MetricDesc, Observation, Schema};

/// Map a decoded snapshot onto the data metric families.
///
/// The output order is fixed and observations of one family are always
/// adjacent. `num_apps` and `update` are skipped entirely when the snapshot
/// does not carry the records they read from.
pub fn map_snapshot<'s>(schema: &'s Schema, snapshot: &Snapshot) -> Vec<Observation<'s>> {
    let data = snapshot.data();
    let system = &data.nextcloud.system;
    let storage = &data.nextcloud.storage;
    let shares = &data.nextcloud.shares;
    let server = &data.server;

    let mut out = Vec::with_capacity(23);

    out.push(Observation::new(
        &schema.system_info,
        vec![
            system.version.clone(),
            server.php.version.clone(),
            server.webserver.clone(),
            server.database.kind.clone(),
            server.database.version.clone(),
        ],
        1.0,
    ));

    if let Some(apps) = &system.apps {
        out.push(labeled(&schema.num_apps, "installed", apps.installed));
        out.push(labeled(&schema.num_apps, "updates_available", apps.updates_available));
    }

    if let Some(update) = &system.update {
        let available = if update.available { 1.0 } else { 0.0 };
        out.push(Observation::unlabeled(&schema.update, available));
    }

    out.push(labeled(&schema.num_users, "active", data.active_users.last_5_minutes));
    out.push(labeled(&schema.num_users, "registered", storage.num_users));

    out.push(Observation::unlabeled(&schema.num_files, storage.num_files as f64));

    out.push(labeled(&schema.num_storages, "home", storage.num_storages_home));
    out.push(labeled(&schema.num_storages, "local", storage.num_storages_local));
    out.push(labeled(&schema.num_storages, "other", storage.num_storages_other));

    out.push(Observation::unlabeled(&schema.free_space, system.free_space as f64));

    // Not clamped: an inconsistent upstream report shows up as a negative value.
    let link_password = shares.num_shares_link - shares.num_shares_link_no_password;
    out.push(labeled(&schema.shares, "user", shares.num_shares_user));
    out.push(labeled(&schema.shares, "groups", shares.num_shares_groups));
    out.push(labeled(&schema.shares, "mail", shares.num_shares_mail));
    out.push(labeled(&schema.shares, "room", shares.num_shares_room));
    out.push(labeled(&schema.shares, "link_password", link_password));
    out.push(labeled(&schema.shares, "link_nopassword", shares.num_shares_link_no_password));

    out.push(labeled(&schema.fed_shares, "sent", shares.num_fed_shares_sent));
    out.push(labeled(&schema.fed_shares, "received", shares.num_fed_shares_received));

    out.push(Observation::unlabeled(
        &schema.php_max_execution_time,
        server.php.max_execution_time as f64,
    ));
    out.push(Observation::unlabeled(
        &schema.php_memory_limit,
        server.php.memory_limit as f64,
    ));
    out.push(Observation::unlabeled(
        &schema.php_upload_max_size,
        server.php.upload_max_file_size as f64,
    ));
    out.push(Observation::unlabeled(&schema.db_size, server.database.size as f64));

    out
}

fn labeled<'s>(desc: &'s MetricDesc, label: &str, value: i64) -> Observation<'s> {
    Observation::new(desc, vec![label.to_string()], value as f64)
}
