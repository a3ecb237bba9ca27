//! Public models for the passport module.
//!
//! These are transport-agnostic data structures shared between the passport
//! module and its consumers. String-backed storage values are represented as
//! closed enums; conversion from storage goes through `FromStr` and fails on
//! anything outside the known set.

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::UnknownVariant;

/// Account-independent authentication anchor: one per normalized email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email_address: String,
    pub staff: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MagicLinkPurpose {
    #[default]
    SignIn,
    SignUp,
}

impl MagicLinkPurpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
        }
    }
}

/// Single-use, time-limited code granting authentication for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLink {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub code: String,
    pub purpose: MagicLinkPurpose,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl MagicLink {
    /// A link is expired once `now` reaches its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Persisted anchor for a signed client credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Owner,
    Admin,
    #[default]
    Member,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Owners and admins may perform administrative actions.
    #[must_use]
    pub const fn has_admin_access(self) -> bool {
        match self {
            Self::Owner | Self::Admin => true,
            Self::Member => false,
        }
    }
}

/// Tenant membership binding one identity to one account.
///
/// `identity_id` is `None` once the membership has been deactivated; the row
/// is kept so owned resources keep their attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub account_id: Uuid,
    pub identity_id: Option<Uuid>,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    #[must_use]
    pub const fn has_admin_access(&self) -> bool {
        self.role.has_admin_access()
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

/// Tenant root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubscriptionStatus {
    #[default]
    Trialing,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Plan {
    #[default]
    Individual,
    Team,
    Enterprise,
}

impl Plan {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Team => "team",
            Self::Enterprise => "enterprise",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub account_id: Uuid,
    pub status: SubscriptionStatus,
    pub plan: Plan,
    pub seat_limit: i32,
    pub seats_used: i32,
    pub trial_ends_at: Option<OffsetDateTime>,
    pub current_period_ends_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Subscription {
    #[must_use]
    pub const fn is_active_or_trialing(&self) -> bool {
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trialing => true,
            SubscriptionStatus::PastDue | SubscriptionStatus::Canceled => false,
        }
    }

    /// Trialing with a trial end still in the future.
    #[must_use]
    pub fn is_trial_active(&self, now: OffsetDateTime) -> bool {
        self.status == SubscriptionStatus::Trialing
            && self.trial_ends_at.is_some_and(|ends| ends > now)
    }

    #[must_use]
    pub const fn seats_available(&self) -> bool {
        self.seats_used < self.seat_limit
    }

    #[must_use]
    pub const fn seats_remaining(&self) -> i32 {
        self.seat_limit - self.seats_used
    }
}

/// Input for the atomic account + owner + subscription creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub account_name: String,
    pub owner_identity_id: Uuid,
    pub owner_name: String,
    pub plan: Plan,
    pub seat_limit: i32,
    pub seats_used: i32,
    pub trial_ends_at: Option<OffsetDateTime>,
}

/// Result of a successful tenant creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub account: Account,
    pub owner: User,
    pub subscription: Subscription,
}

/// Request-scoped authentication context.
///
/// Built once per request by the session manager and passed explicitly to
/// every guard and protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub session: Session,
    pub identity: Identity,
    pub user: Option<User>,
    pub account: Option<Account>,
    pub subscription: Option<Subscription>,
}

impl AuthContext {
    /// Rebinds the context to a freshly created tenant (sign-up completion).
    #[must_use]
    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.user = Some(tenant.owner);
        self.account = Some(tenant.account);
        self.subscription = Some(tenant.subscription);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

macro_rules! string_enum {
    ($ty:ident, $label:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == Self::$variant.as_str() {
                        return Ok(Self::$variant);
                    }
                )+
                Err(UnknownVariant::new($label, s))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(MagicLinkPurpose, "magic link purpose", [SignIn, SignUp]);
string_enum!(Role, "role", [Owner, Admin, Member]);
string_enum!(
    SubscriptionStatus,
    "subscription status",
    [Trialing, Active, PastDue, Canceled]
);
string_enum!(Plan, "plan", [Individual, Team, Enterprise]);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::Duration;

    fn subscription(status: SubscriptionStatus) -> Subscription {
        let now = OffsetDateTime::now_utc();
        Subscription {
            id: Uuid::now_v7(),
            account_id: Uuid::now_v7(),
            status,
            plan: Plan::Individual,
            seat_limit: 3,
            seats_used: 1,
            trial_ends_at: Some(now + Duration::days(14)),
            current_period_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn string_enums_parse_their_own_rendering() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "past_due".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::PastDue
        );
        assert_eq!(
            "sign_up".parse::<MagicLinkPurpose>().unwrap(),
            MagicLinkPurpose::SignUp
        );
    }

    #[test]
    fn unknown_values_are_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role: superuser");
        assert!("gold".parse::<Plan>().is_err());
    }

    #[test]
    fn admin_access_is_owner_or_admin() {
        assert!(Role::Owner.has_admin_access());
        assert!(Role::Admin.has_admin_access());
        assert!(!Role::Member.has_admin_access());
    }

    #[test]
    fn active_or_trialing() {
        assert!(subscription(SubscriptionStatus::Active).is_active_or_trialing());
        assert!(subscription(SubscriptionStatus::Trialing).is_active_or_trialing());
        assert!(!subscription(SubscriptionStatus::PastDue).is_active_or_trialing());
        assert!(!subscription(SubscriptionStatus::Canceled).is_active_or_trialing());
    }

    #[test]
    fn trial_active_requires_future_end() {
        let now = OffsetDateTime::now_utc();
        let mut sub = subscription(SubscriptionStatus::Trialing);
        assert!(sub.is_trial_active(now));

        sub.trial_ends_at = Some(now - Duration::seconds(1));
        assert!(!sub.is_trial_active(now));

        sub.trial_ends_at = None;
        assert!(!sub.is_trial_active(now));
    }

    #[test]
    fn seats() {
        let mut sub = subscription(SubscriptionStatus::Active);
        assert!(sub.seats_available());
        assert_eq!(sub.seats_remaining(), 2);

        sub.seats_used = 3;
        assert!(!sub.seats_available());
        assert_eq!(sub.seats_remaining(), 0);
    }
}
