use std::collections::HashMap;
use std::sync::Arc;

use people_counter::config::DatabaseConfig;
use people_counter::db::models::CountingEvent;
use people_counter::db::repositories::EventsRepository;
use people_counter::db::DatabaseService;
use people_counter::utils::alertparser::CameraNotification;

fn notification(ip_address: &str, date_time: &str, enter: i64, exit: i64) -> CameraNotification {
    CameraNotification {
        ip_address: ip_address.to_string(),
        mac_address: "c0:56:e3:d2:11:9a".to_string(),
        channel_id: "1".to_string(),
        channel_name: "Lobby".to_string(),
        event_type: "PeopleCounting".to_string(),
        event_state: "active".to_string(),
        date_time: date_time.to_string(),
        enter,
        exit,
        counting_scene_mode: "indoor".to_string(),
        extra: HashMap::new(),
    }
}

async fn file_backed_service(dir: &tempfile::TempDir) -> DatabaseService {
    let path = dir.path().join("events.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 2,
        auto_migrate: true,
    };

    DatabaseService::new(&config)
        .await
        .expect("Failed to create database service")
}

#[tokio::test]
async fn service_creates_and_migrates_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_backed_service(&dir).await;

    assert!(service.health_check().await.unwrap());

    let repo = EventsRepository::new(Arc::clone(&service.pool));
    let event =
        CountingEvent::from_notification(&notification("10.0.0.5", "2024-01-01T10:00:00+0700", 3, 1));
    let stored = repo.insert(&event).await.unwrap();

    assert_eq!(stored.local_time, "20240101100000");
    assert_eq!(stored.date_time, "2024-01-01T10:00:00+0700");
    assert!(repo.exists_for_camera("10.0.0.5").await.unwrap());
    assert!(!repo.exists_for_camera("10.0.0.9").await.unwrap());

    let totals = repo
        .sum_in_range("10.0.0.5", "19700101000000", "20991231235959")
        .await
        .unwrap();
    assert_eq!(totals.total_enter, 3);
    assert_eq!(totals.total_exit, 1);
}

#[tokio::test]
async fn unreadable_camera_time_never_matches_a_window() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_backed_service(&dir).await;
    let repo = EventsRepository::new(Arc::clone(&service.pool));

    let event = CountingEvent::from_notification(&notification("10.0.0.5", "garbage", 5, 5));
    repo.insert(&event).await.unwrap();

    // Stored and listed, but invisible to any valid range
    assert!(repo.exists_for_camera("10.0.0.5").await.unwrap());
    let listed = repo.list_recent(Some("10.0.0.5"), None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].local_time, "");

    let totals = repo
        .sum_in_range("10.0.0.5", "19700101000000", "20991231235959")
        .await
        .unwrap();
    assert_eq!(totals.total_enter, 0);
    assert_eq!(totals.total_exit, 0);
}

#[tokio::test]
async fn list_recent_respects_limit() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_backed_service(&dir).await;
    let repo = EventsRepository::new(Arc::clone(&service.pool));

    for hour in 8..12 {
        let date_time = format!("2024-03-05T{:02}:00:00+0700", hour);
        let event =
            CountingEvent::from_notification(&notification("10.0.0.5", &date_time, 1, 0));
        repo.insert(&event).await.unwrap();
    }

    let listed = repo.list_recent(None, Some(2)).await.unwrap();
    assert_eq!(listed.len(), 2);

    let all = repo.list_recent(None, None).await.unwrap();
    assert_eq!(all.len(), 4);
}
