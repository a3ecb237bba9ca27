//! Row <-> model conversions. String columns are parsed into closed enums
//! here; an unknown stored value is surfaced as a storage error.

use passport_sdk::{
    Account, Article, Identity, MagicLink, Session, Subscription, UnknownVariant, User,
};
use sea_orm::Set;

use super::entity::{account, article, identity, magic_link, session, subscription, user};

impl From<identity::Model> for Identity {
    fn from(m: identity::Model) -> Self {
        Self {
            id: m.id,
            email_address: m.email_address,
            staff: m.staff,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&Identity> for identity::ActiveModel {
    fn from(i: &Identity) -> Self {
        Self {
            id: Set(i.id),
            email_address: Set(i.email_address.clone()),
            staff: Set(i.staff),
            created_at: Set(i.created_at),
            updated_at: Set(i.updated_at),
        }
    }
}

impl TryFrom<magic_link::Model> for MagicLink {
    type Error = UnknownVariant;

    fn try_from(m: magic_link::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            identity_id: m.identity_id,
            code: m.code,
            purpose: m.purpose.parse()?,
            expires_at: m.expires_at,
            created_at: m.created_at,
        })
    }
}

impl From<&MagicLink> for magic_link::ActiveModel {
    fn from(l: &MagicLink) -> Self {
        Self {
            id: Set(l.id),
            identity_id: Set(l.identity_id),
            code: Set(l.code.clone()),
            purpose: Set(l.purpose.as_str().to_owned()),
            expires_at: Set(l.expires_at),
            created_at: Set(l.created_at),
        }
    }
}

impl From<session::Model> for Session {
    fn from(m: session::Model) -> Self {
        Self {
            id: m.id,
            identity_id: m.identity_id,
            ip_address: m.ip_address,
            user_agent: m.user_agent,
            created_at: m.created_at,
        }
    }
}

impl From<&Session> for session::ActiveModel {
    fn from(s: &Session) -> Self {
        Self {
            id: Set(s.id),
            identity_id: Set(s.identity_id),
            ip_address: Set(s.ip_address.clone()),
            user_agent: Set(s.user_agent.clone()),
            created_at: Set(s.created_at),
        }
    }
}

impl From<account::Model> for Account {
    fn from(m: account::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl TryFrom<user::Model> for User {
    type Error = UnknownVariant;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            account_id: m.account_id,
            identity_id: m.identity_id,
            name: m.name,
            role: m.role.parse()?,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<subscription::Model> for Subscription {
    type Error = UnknownVariant;

    fn try_from(m: subscription::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            account_id: m.account_id,
            status: m.status.parse()?,
            plan: m.plan.parse()?,
            seat_limit: m.seat_limit,
            seats_used: m.seats_used,
            trial_ends_at: m.trial_ends_at,
            current_period_ends_at: m.current_period_ends_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<article::Model> for Article {
    fn from(m: article::Model) -> Self {
        Self {
            id: m.id,
            account_id: m.account_id,
            user_id: m.user_id,
            title: m.title,
            body: m.body,
            published: m.published,
            published_at: m.published_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&Article> for article::ActiveModel {
    fn from(a: &Article) -> Self {
        Self {
            id: Set(a.id),
            account_id: Set(a.account_id),
            user_id: Set(a.user_id),
            title: Set(a.title.clone()),
            body: Set(a.body.clone()),
            published: Set(a.published),
            published_at: Set(a.published_at),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
        }
    }
}
