use std::collections::BTreeSet;

/// Every permission key the application checks, with a description.
///
/// Keys are `<category>.<action>`. A grant of `<category>.*` covers every
/// registered key in the category and `*` covers every registered key.
pub const PERMISSIONS: &[(&str, &str)] = &[
    ("dashboard.view", "View the role dashboard"),
    ("beneficiaries.view", "View beneficiaries"),
    ("beneficiaries.create", "Register beneficiaries"),
    ("beneficiaries.update", "Edit beneficiary records"),
    ("beneficiaries.delete", "Remove beneficiaries"),
    ("beneficiaries.view_own", "View own beneficiary profile"),
    ("requests.view", "View beneficiary requests"),
    ("requests.create", "Submit beneficiary requests"),
    ("requests.approve", "Approve or reject beneficiary requests"),
    ("properties.view", "View waqf properties and units"),
    ("properties.create", "Add properties and units"),
    ("properties.update", "Edit properties and units"),
    ("properties.delete", "Remove properties and units"),
    ("contracts.view", "View rental contracts"),
    ("contracts.create", "Create rental contracts"),
    ("contracts.update", "Edit or renew rental contracts"),
    ("contracts.delete", "Terminate rental contracts"),
    ("tenants.view", "View tenants"),
    ("tenants.manage", "Create and edit tenants"),
    ("accounts.view", "View the chart of accounts"),
    ("accounts.manage", "Edit the chart of accounts"),
    ("journal.view", "View journal entries"),
    ("journal.create", "Create journal entries"),
    ("journal.update", "Edit draft journal entries"),
    ("journal.delete", "Delete draft journal entries"),
    ("journal.approve", "Post journal entries"),
    ("fiscal_years.manage", "Open and close fiscal years"),
    ("distributions.view", "View distributions"),
    ("distributions.create", "Prepare distributions"),
    ("distributions.approve", "Approve distributions"),
    ("payments.view", "View payments and vouchers"),
    ("payments.create", "Record payments and receipts"),
    ("payments.approve", "Approve payment vouchers"),
    ("invoices.view", "View invoices"),
    ("invoices.create", "Issue invoices"),
    ("documents.view", "View the document archive"),
    ("documents.upload", "Upload documents"),
    ("documents.delete", "Delete documents"),
    ("maintenance.view", "View maintenance requests"),
    ("maintenance.manage", "Create and close maintenance requests"),
    ("reports.view", "View financial and operational reports"),
    ("reports.export", "Export reports to PDF, Excel or CSV"),
    ("users.view", "View user accounts"),
    ("users.manage", "Create users and assign roles"),
    ("audit.view", "View the audit log"),
    ("settings.manage", "Change system settings"),
];

/// Whether `key` is a registered permission in `registry`.
pub fn is_registered(registry: &BTreeSet<String>, key: &str) -> bool {
    registry.contains(key)
}

/// Default registry built from [`PERMISSIONS`].
pub fn default_registry() -> BTreeSet<String> {
    PERMISSIONS.iter().map(|(k, _)| k.to_string()).collect()
}

/// Whether a single grant covers `required`.
pub fn grant_covers(grant: &str, required: &str) -> bool {
    if grant == "*" || grant == required {
        return true;
    }
    match (grant.strip_suffix(".*"), required.split_once('.')) {
        (Some(category), Some((req_category, _))) => !category.is_empty() && category == req_category,
        _ => false,
    }
}

/// True iff `required` is registered and covered by one of the grants.
/// Empty or unregistered keys are denied.
pub fn has_permission(
    registry: &BTreeSet<String>,
    granted: &BTreeSet<String>,
    required: &str,
) -> bool {
    if required.is_empty() || !is_registered(registry, required) {
        return false;
    }
    granted.iter().any(|g| grant_covers(g, required))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn keys_are_unique_and_dotted() {
        let registry = default_registry();
        assert_eq!(registry.len(), PERMISSIONS.len());
        assert!(PERMISSIONS.iter().all(|(k, _)| k.contains('.')));
    }

    #[test]
    fn exact_match() {
        let registry = default_registry();
        let granted = set(&["journal.view"]);
        assert!(has_permission(&registry, &granted, "journal.view"));
        assert!(!has_permission(&registry, &granted, "journal.create"));
    }

    #[test]
    fn category_wildcard() {
        let registry = default_registry();
        let granted = set(&["journal.*"]);
        assert!(has_permission(&registry, &granted, "journal.approve"));
        assert!(!has_permission(&registry, &granted, "payments.view"));
    }

    #[test]
    fn global_wildcard_still_requires_registration() {
        let registry = default_registry();
        let granted = set(&["*"]);
        assert!(has_permission(&registry, &granted, "users.manage"));
        assert!(!has_permission(&registry, &granted, "rockets.launch"));
        assert!(!has_permission(&registry, &granted, ""));
    }

    #[test]
    fn bare_wildcard_suffix_does_not_match_everything() {
        assert!(!grant_covers(".*", "journal.view"));
        assert!(!grant_covers("journal.*", "journalist"));
    }
}
