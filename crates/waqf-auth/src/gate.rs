use crate::resolver::{PermissionDecision, PermissionResolver};

/// What a gated region should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Children,
    Fallback,
    Loader,
}

/// Render-time guard over one or more permission keys.
///
/// Holds no state besides its configuration; every call to [`decide`]
/// consults the resolver it is given.
///
/// [`decide`]: PermissionGate::decide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGate {
    keys: Vec<String>,
    require_all: bool,
    show_loader: bool,
}

impl PermissionGate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            keys: vec![key.into()],
            require_all: false,
            show_loader: false,
        }
    }

    pub fn any_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            require_all: false,
            show_loader: false,
        }
    }

    pub fn all_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            require_all: true,
            ..Self::any_of(keys)
        }
    }

    pub fn require_all(mut self, require_all: bool) -> Self {
        self.require_all = require_all;
        self
    }

    /// Show a loading placeholder instead of the fallback while roles load.
    pub fn with_loader(mut self) -> Self {
        self.show_loader = true;
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn decision(&self, resolver: &PermissionResolver) -> PermissionDecision {
        if self.require_all {
            resolver.has_all_permissions(&self.keys)
        } else {
            resolver.has_any_permission(&self.keys)
        }
    }

    pub fn decide(&self, resolver: &PermissionResolver) -> GateOutcome {
        match self.decision(resolver) {
            PermissionDecision::Pending if self.show_loader => GateOutcome::Loader,
            PermissionDecision::Pending | PermissionDecision::Denied => GateOutcome::Fallback,
            PermissionDecision::Granted => GateOutcome::Children,
        }
    }

    /// Produce the view for the current decision. A missing fallback renders
    /// nothing; a requested loader without a loader view also renders nothing.
    pub fn render<T>(
        &self,
        resolver: &PermissionResolver,
        children: impl FnOnce() -> T,
        fallback: Option<impl FnOnce() -> T>,
        loader: Option<impl FnOnce() -> T>,
    ) -> Option<T> {
        match self.decide(resolver) {
            GateOutcome::Children => Some(children()),
            GateOutcome::Fallback => fallback.map(|f| f()),
            GateOutcome::Loader => loader.map(|l| l()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{AppRole, RoleCatalog};
    use std::sync::Arc;

    fn ready(roles: &[AppRole]) -> PermissionResolver {
        PermissionResolver::from_roles(Arc::new(RoleCatalog::default()), roles)
    }

    fn loading() -> PermissionResolver {
        PermissionResolver::loading(Arc::new(RoleCatalog::default()))
    }

    #[test]
    fn pending_shows_fallback_without_loader() {
        let gate = PermissionGate::new("journal.view");
        assert_eq!(gate.decide(&loading()), GateOutcome::Fallback);
    }

    #[test]
    fn pending_shows_loader_when_requested() {
        let gate = PermissionGate::new("journal.view").with_loader();
        assert_eq!(gate.decide(&loading()), GateOutcome::Loader);
        let view = gate.render(
            &loading(),
            || "children",
            Some(|| "fallback"),
            Some(|| "spinner"),
        );
        assert_eq!(view, Some("spinner"));
    }

    #[test]
    fn granted_shows_children() {
        let gate = PermissionGate::new("journal.create");
        let resolver = ready(&[AppRole::Accountant]);
        assert_eq!(gate.decide(&resolver), GateOutcome::Children);
    }

    #[test]
    fn denied_shows_fallback_or_nothing() {
        let gate = PermissionGate::new("users.manage");
        let resolver = ready(&[AppRole::Cashier]);
        let none: Option<fn() -> &'static str> = None;
        assert_eq!(gate.render(&resolver, || "children", none, none), None);
        assert_eq!(
            gate.render(&resolver, || "children", Some(|| "fallback"), none),
            Some("fallback")
        );
    }

    #[test]
    fn require_all_versus_any() {
        let resolver = ready(&[AppRole::Cashier]);
        let any = PermissionGate::any_of(["payments.create", "payments.approve"]);
        let all = PermissionGate::all_of(["payments.create", "payments.approve"]);
        assert_eq!(any.decide(&resolver), GateOutcome::Children);
        assert_eq!(all.decide(&resolver), GateOutcome::Fallback);
        assert_eq!(
            any.clone().require_all(true).decide(&resolver),
            GateOutcome::Fallback
        );
    }

    #[test]
    fn re_evaluates_when_roles_change() {
        let gate = PermissionGate::new("payments.approve");
        assert_eq!(gate.decide(&ready(&[AppRole::Cashier])), GateOutcome::Fallback);
        assert_eq!(
            gate.decide(&ready(&[AppRole::Cashier, AppRole::Accountant])),
            GateOutcome::Children
        );
    }
}
