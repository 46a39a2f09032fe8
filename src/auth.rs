//! Sender authorization
//!
//! The bot front-end asks an [`Authorizer`] before handing any message to the
//! pipeline. The pipeline itself never checks identities.

/// Decides whether a sender may use the bot
///
/// Any `Fn(u64) -> bool` closure is an `Authorizer`, which keeps custom
/// policies (allow-lists, lookups) a one-liner.
pub trait Authorizer: Send + Sync {
    /// Whether the user with this id is allowed
    fn is_authorized(&self, sender_id: u64) -> bool;

    /// Guard for messages whose sender may be unknown (channel posts, anonymous admins)
    ///
    /// Unknown senders are always rejected.
    fn check(&self, sender_id: Option<u64>) -> bool {
        sender_id.is_some_and(|id| self.is_authorized(id))
    }
}

impl<F> Authorizer for F
where
    F: Fn(u64) -> bool + Send + Sync,
{
    fn is_authorized(&self, sender_id: u64) -> bool {
        self(sender_id)
    }
}

/// Allows exactly one user id
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerOnly {
    owner_id: u64,
}

impl OwnerOnly {
    /// Allow only `owner_id`
    pub fn new(owner_id: u64) -> Self {
        Self { owner_id }
    }

    /// The allowed user id
    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }
}

impl Authorizer for OwnerOnly {
    fn is_authorized(&self, sender_id: u64) -> bool {
        sender_id == self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_only() {
        let auth = OwnerOnly::new(7833842279);
        assert!(auth.is_authorized(7833842279));
        assert!(!auth.is_authorized(1));
        assert_eq!(auth.owner_id(), 7833842279);
    }

    #[test]
    fn test_unknown_sender_is_rejected() {
        let auth = OwnerOnly::new(42);
        assert!(auth.check(Some(42)));
        assert!(!auth.check(Some(43)));
        assert!(!auth.check(None));
    }

    #[test]
    fn test_closure_authorizer() {
        let allowed = [1_u64, 2, 3];
        let auth = move |id: u64| allowed.contains(&id);
        assert!(auth.check(Some(2)));
        assert!(!auth.check(Some(4)));
    }

    #[test]
    fn test_boxed_authorizer() {
        let auth: Box<dyn Authorizer> = Box::new(OwnerOnly::new(5));
        assert!(auth.check(Some(5)));
    }
}
