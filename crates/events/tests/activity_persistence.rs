use pmo_core::domain::ActivityAction;
use pmo_db::models::user::CreateUser;
use pmo_db::repositories::{ActivityLogRepo, UserRepo};
use pmo_events::{ActivityEvent, ActivityPersistence, EventBus};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool) -> i64 {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "auditor".to_string(),
            email: "auditor@example.com".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: "team_member".to_string(),
        },
    )
    .await
    .unwrap();
    user.id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_published_events_are_written_until_bus_closes(pool: PgPool) {
    let user_id = seed_user(&pool).await;

    let bus = EventBus::default();
    let handle = tokio::spawn(ActivityPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(ActivityEvent::new(ActivityAction::Login, user_id).with_description("Logged in"));
    bus.publish(
        ActivityEvent::new(ActivityAction::Create, user_id)
            .with_object("project", 12)
            .with_description("Created project ERP"),
    );

    // Dropping the bus closes the channel; the loop drains and exits.
    drop(bus);
    handle.await.unwrap();

    let logs = ActivityLogRepo::list_for_user(&pool, user_id, 50, 0).await.unwrap();
    assert_eq!(logs.len(), 2);
    let actions: Vec<_> = logs.iter().map(|l| l.action).collect();
    assert!(actions.contains(&ActivityAction::Login));
    let created = logs
        .iter()
        .find(|l| l.action == ActivityAction::Create)
        .unwrap();
    assert_eq!(created.model_name, "project");
    assert_eq!(created.object_id, Some(12));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_event_for_unknown_user_is_skipped(pool: PgPool) {
    let bus = EventBus::default();
    let handle = tokio::spawn(ActivityPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(ActivityEvent::new(ActivityAction::View, 999_999));
    drop(bus);
    handle.await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activity_logs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
