//! `user.created` mapping.
//!
//! The subscriber identifier is the configured prefix plus the user's
//! primary (first listed) email address.

use serde_json::{Map, Value};

use super::{IgnoreReason, Notification, SubscriberOptions};
use crate::event::UserData;
use crate::notify::{NotificationPayload, Subscriber};

/// Workflow fired for every new user.
pub const USER_CREATED_WORKFLOW: &str = "clerk-user-created";

pub fn plan_user_created(
    user: &UserData,
    options: &SubscriberOptions,
) -> Result<Notification, IgnoreReason> {
    let email = user.primary_email().ok_or(IgnoreReason::MissingRecipient)?;

    let mut subscriber = Subscriber::new(options.subscriber_id(email), options.locale.as_str());
    subscriber.first_name = user.first_name.clone().unwrap_or_default();
    subscriber.last_name = user.last_name.clone().unwrap_or_default();
    subscriber.email = email.to_string();
    subscriber.phone = user.primary_phone().unwrap_or_default().to_string();
    subscriber.avatar = user.image_url.clone().unwrap_or_default();
    subscriber.metadata = metadata(user);

    Ok(Notification {
        workflow_id: USER_CREATED_WORKFLOW.to_string(),
        subscriber,
        payload: NotificationPayload::new(),
    })
}

fn metadata(user: &UserData) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("createdAt".to_string(), Value::from(user.created_at));
    data.insert("lastSignInAt".to_string(), Value::from(user.last_sign_in_at));
    data.insert("updatedAt".to_string(), Value::from(user.updated_at));
    data.insert("username".to_string(), Value::from(user.username.clone()));
    data.insert("clerkUserId".to_string(), Value::from(user.id.clone()));
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: Value) -> UserData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_user_created_sample_mapping() {
        let data = user(json!({
            "id": "usr_1",
            "email_addresses": [{"email_address": "a@example.com"}],
            "first_name": "Ada"
        }));

        let n = plan_user_created(&data, &SubscriberOptions::default()).unwrap();

        assert_eq!(n.workflow_id, "clerk-user-created");
        assert_eq!(n.subscriber.subscriber_id, "clerk_a@example.com");
        assert_eq!(n.subscriber.first_name, "Ada");
        assert_eq!(n.subscriber.last_name, "");
        assert_eq!(n.subscriber.email, "a@example.com");
        assert_eq!(n.subscriber.phone, "");
        assert_eq!(n.subscriber.avatar, "");
        assert_eq!(n.subscriber.locale, "en_US");
        assert!(n.payload.is_empty());
    }

    #[test]
    fn test_user_created_full_record() {
        let data = user(json!({
            "id": "usr_2",
            "email_addresses": [
                {"id": "idn_1", "email_address": "first@example.com"},
                {"id": "idn_2", "email_address": "second@example.com"}
            ],
            "phone_numbers": [{"phone_number": "+15555550100"}, {"phone_number": "+15555550199"}],
            "first_name": "Grace",
            "last_name": "Hopper",
            "username": "ghopper",
            "image_url": "https://img.example.com/g.png",
            "created_at": 1700000000000i64,
            "updated_at": 1700000001000i64,
            "last_sign_in_at": null
        }));

        let n = plan_user_created(&data, &SubscriberOptions::default()).unwrap();
        let s = &n.subscriber;

        assert_eq!(s.subscriber_id, "clerk_first@example.com");
        assert_eq!(s.last_name, "Hopper");
        assert_eq!(s.phone, "+15555550100");
        assert_eq!(s.avatar, "https://img.example.com/g.png");
        assert_eq!(s.metadata["createdAt"], json!(1700000000000i64));
        assert_eq!(s.metadata["updatedAt"], json!(1700000001000i64));
        assert_eq!(s.metadata["lastSignInAt"], Value::Null);
        assert_eq!(s.metadata["username"], json!("ghopper"));
        assert_eq!(s.metadata["clerkUserId"], json!("usr_2"));
    }

    #[test]
    fn test_user_created_is_deterministic() {
        let data = user(json!({
            "id": "usr_1",
            "email_addresses": [{"email_address": "a@example.com"}]
        }));
        let options = SubscriberOptions::default();

        assert_eq!(
            plan_user_created(&data, &options),
            plan_user_created(&data.clone(), &options)
        );
    }

    #[test]
    fn test_user_created_custom_options() {
        let data = user(json!({
            "id": "usr_1",
            "email_addresses": [{"email_address": "a@example.com"}]
        }));
        let options = SubscriberOptions {
            id_prefix: "acme_".to_string(),
            locale: "de_DE".to_string(),
        };

        let n = plan_user_created(&data, &options).unwrap();
        assert_eq!(n.subscriber.subscriber_id, "acme_a@example.com");
        assert_eq!(n.subscriber.locale, "de_DE");
    }

    #[test]
    fn test_user_created_without_email_ignored() {
        let data = user(json!({"id": "usr_1", "email_addresses": []}));
        assert_eq!(
            plan_user_created(&data, &SubscriberOptions::default()),
            Err(IgnoreReason::MissingRecipient)
        );
    }
}
