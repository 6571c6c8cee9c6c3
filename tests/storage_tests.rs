//! Warehouse tests
//!
//! Run against temporary SQLite databases; migrations are applied on connect.

use chrono::{Duration, Utc};
use privacy_shield::config::DatabaseConfig;
use privacy_shield::storage::{CookieUpload, TrackerUpload, UserScope, Warehouse};
use tempfile::TempDir;

/// 创建临时 SQLite 仓库
async fn create_temp_warehouse() -> (Warehouse, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("warehouse.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let warehouse = Warehouse::connect(&config)
        .await
        .expect("Failed to create warehouse");
    (warehouse, temp_dir)
}

fn tracker(domain: &str, initiator: &str, company: Option<&str>, occurrences: i64) -> TrackerUpload {
    TrackerUpload {
        domain: domain.to_string(),
        full_url: format!("https://{}/collect", domain),
        request_type: "script".to_string(),
        initiator: initiator.to_string(),
        is_third_party: true,
        company: company.map(str::to_string),
        category: company.map(|_| "Advertising".to_string()),
        occurrences,
        ..Default::default()
    }
}

fn cookie(name: &str, domain: &str, third_party: bool, tracker: bool, persistent: bool) -> CookieUpload {
    CookieUpload {
        name: name.to_string(),
        domain: domain.to_string(),
        is_third_party: third_party,
        is_tracker: tracker,
        persistent,
        page_url: "https://news.example.com/".to_string(),
        ..Default::default()
    }
}

fn user(email: &str) -> UserScope {
    UserScope::User(email.to_string())
}

// =============================================================================
// 连接
// =============================================================================

#[cfg(test)]
mod connection_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_runs_migrations() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        assert_eq!(warehouse.backend_name(), "sqlite");
        assert!(warehouse.ping().await);

        let trackers = warehouse.get_trackers(&UserScope::AllUsers, 10).await.unwrap();
        assert!(trackers.is_empty());
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_url() {
        let err = Warehouse::connect(&DatabaseConfig::default())
            .await
            .err()
            .expect("empty url must fail");
        assert_eq!(err.code(), "E001");
    }

    #[tokio::test]
    async fn test_close() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        warehouse.close().await.unwrap();
    }
}

// =============================================================================
// 写入与读取
// =============================================================================

#[cfg(test)]
mod ingest_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_read_back_trackers() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        let batch = vec![
            tracker("doubleclick.net", "news.example.com", Some("Google LLC"), 3),
            tracker("hotjar.com", "shop.example.com", None, 1),
        ];

        let inserted = warehouse
            .insert_trackers(&batch, "alice@example.com", "dev-1")
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let rows = warehouse.get_trackers(&user("alice@example.com"), 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        let hotjar = rows.iter().find(|r| r.domain == "hotjar.com").unwrap();
        // 空公司在视图里显示为 Unknown
        assert_eq!(hotjar.company, "Unknown");
        assert_eq!(hotjar.category, "unknown");
        assert_eq!(hotjar.device_id, "dev-1");

        // 其他用户看不到
        let other = warehouse.get_trackers(&user("bob@example.com"), 10).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batches_are_noops() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        assert_eq!(warehouse.insert_trackers(&[], "a@b.c", "d").await.unwrap(), 0);
        assert_eq!(warehouse.insert_cookies(&[], "a@b.c", "d").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_occurrences_floor_at_one() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        warehouse
            .insert_trackers(&[tracker("a.com", "x.com", None, 0)], "a@b.c", "d")
            .await
            .unwrap();
        let rows = warehouse.get_trackers(&UserScope::AllUsers, 10).await.unwrap();
        assert_eq!(rows[0].occurrences, 1);
    }

    #[tokio::test]
    async fn test_cookie_stats() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        let batch = vec![
            cookie("_ga", "google-analytics.com", true, true, true),
            cookie("session", "shop.example.com", false, false, false),
            cookie("IDE", "doubleclick.net", true, true, false),
        ];
        warehouse
            .insert_cookies(&batch, "alice@example.com", "dev-1")
            .await
            .unwrap();

        let scope = user("alice@example.com");
        let stats = warehouse.get_cookie_stats(&scope).await.unwrap();
        assert_eq!(stats.total_cookies, 3);
        assert_eq!(stats.third_party_count, 2);
        assert_eq!(stats.tracker_count, 2);
        assert_eq!(stats.persistent_count, 1);
        assert_eq!(warehouse.count_cookies(&scope).await.unwrap(), 3);

        let cookies = warehouse.get_cookies(&scope, 2).await.unwrap();
        assert_eq!(cookies.len(), 2);
    }
}

// =============================================================================
// 屏蔽列表
// =============================================================================

#[cfg(test)]
mod blocklist_tests {
    use super::*;

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        assert!(warehouse.add_to_blocklist("ads.com", "a@b.c", "manual").await.unwrap());
        assert!(!warehouse.add_to_blocklist("ads.com", "a@b.c", "again").await.unwrap());

        let list = warehouse.get_blocklist("a@b.c").await.unwrap();
        assert_eq!(list, vec!["ads.com".to_string()]);
    }

    #[tokio::test]
    async fn test_lists_are_per_user() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        warehouse.add_to_blocklist("ads.com", "a@b.c", "").await.unwrap();
        warehouse.add_to_blocklist("ads.com", "x@y.z", "").await.unwrap();
        warehouse.add_to_blocklist("pixel.io", "x@y.z", "").await.unwrap();

        assert_eq!(warehouse.get_blocklist("a@b.c").await.unwrap().len(), 1);
        assert_eq!(warehouse.get_blocklist("x@y.z").await.unwrap().len(), 2);
        assert!(warehouse.get_blocklist("nobody@x.y").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        warehouse.add_to_blocklist("ads.com", "a@b.c", "").await.unwrap();

        assert!(warehouse.remove_from_blocklist("ads.com", "a@b.c").await.unwrap());
        assert!(!warehouse.remove_from_blocklist("ads.com", "a@b.c").await.unwrap());
        assert!(warehouse.get_blocklist("a@b.c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_overlong_values_matches_add() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        let domain = format!("{}.com", "a".repeat(300));
        let email = format!("{}@b.c", "u".repeat(300));

        assert!(warehouse.add_to_blocklist(&domain, &email, "").await.unwrap());
        // 存储时截断到 255，删除用同样的原值也要命中
        assert!(warehouse.remove_from_blocklist(&domain, &email).await.unwrap());
        assert!(warehouse.get_blocklist(&email).await.unwrap().is_empty());
    }
}

// =============================================================================
// 回填
// =============================================================================

#[cfg(test)]
mod enrichment_update_tests {
    use super::*;

    #[tokio::test]
    async fn test_unenriched_selection_and_guarded_update() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        let batch = vec![
            tracker("doubleclick.net", "a.com", None, 1),
            tracker("facebook.net", "a.com", Some("Facebook, Inc."), 1),
        ];
        warehouse.insert_trackers(&batch, "a@b.c", "d").await.unwrap();

        let pending = warehouse.get_unenriched_trackers(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].domain, "doubleclick.net");

        assert!(
            warehouse
                .update_enriched_tracker(pending[0].id, "Google LLC", "Advertising")
                .await
                .unwrap()
        );
        // 已标注的行不会被覆盖
        assert!(
            !warehouse
                .update_enriched_tracker(pending[0].id, "Someone Else", "Analytics")
                .await
                .unwrap()
        );
        assert!(warehouse.get_unenriched_trackers(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_label_is_final() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        warehouse
            .insert_trackers(&[tracker("mystery.io", "a.com", None, 1)], "a@b.c", "d")
            .await
            .unwrap();
        let id = warehouse.get_unenriched_trackers(10).await.unwrap()[0].id;

        assert!(warehouse.update_enriched_tracker(id, "Unknown", "Unknown").await.unwrap());
        assert!(warehouse.get_unenriched_trackers(10).await.unwrap().is_empty());

        // Unknown 也是标签，只填一次
        assert!(!warehouse.update_enriched_tracker(id, "Mystery Inc", "Tracking").await.unwrap());
        let rows = warehouse
            .get_trackers(&user("a@b.c"), 10)
            .await
            .unwrap();
        assert_eq!(rows[0].company, "Unknown");
    }
}

// =============================================================================
// 聚合
// =============================================================================

#[cfg(test)]
mod aggregate_tests {
    use super::*;

    async fn seeded() -> (Warehouse, TempDir) {
        let (warehouse, dir) = create_temp_warehouse().await;
        let batch = vec![
            tracker("doubleclick.net", "news.example.com", Some("Google LLC"), 5),
            tracker("google-analytics.com", "news.example.com", Some("Google LLC"), 2),
            tracker("doubleclick.net", "shop.example.com", Some("Google LLC"), 1),
            tracker("hotjar.com", "shop.example.com", None, 4),
        ];
        warehouse
            .insert_trackers(&batch, "alice@example.com", "dev-1")
            .await
            .unwrap();
        warehouse
            .insert_trackers(
                &[tracker("criteo.com", "other.example.com", Some("Criteo SA"), 9)],
                "bob@example.com",
                "dev-2",
            )
            .await
            .unwrap();
        (warehouse, dir)
    }

    #[tokio::test]
    async fn test_totals_are_scoped() {
        let (warehouse, _dir) = seeded().await;

        let alice = warehouse
            .tracker_totals(&user("alice@example.com"), None)
            .await
            .unwrap();
        assert_eq!(alice.total_trackers, 4);
        assert_eq!(alice.unique_sites, 2);

        let everyone = warehouse.tracker_totals(&UserScope::AllUsers, None).await.unwrap();
        assert_eq!(everyone.total_trackers, 5);
        assert_eq!(everyone.unique_sites, 3);

        // 未来的起点：没有数据
        let future = warehouse
            .tracker_totals(&UserScope::AllUsers, Some(Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(future.total_trackers, 0);
    }

    #[tokio::test]
    async fn test_daily_buckets_use_calendar_date() {
        let (warehouse, _dir) = seeded().await;
        let rows = warehouse
            .tracker_daily(&user("alice@example.com"), Utc::now() - Duration::days(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, Utc::now().date_naive().format("%Y-%m-%d").to_string());
        assert_eq!(rows[0].count, 4);
    }

    #[tokio::test]
    async fn test_top_lists() {
        let (warehouse, _dir) = seeded().await;
        let scope = user("alice@example.com");

        let domains = warehouse.top_domains(&scope, 10).await.unwrap();
        assert_eq!(domains[0].domain, "doubleclick.net");
        assert_eq!(domains[0].count, 2);

        let initiators = warehouse.top_initiators(&scope, 1).await.unwrap();
        assert_eq!(initiators.len(), 1);

        let categories = warehouse.category_counts(&scope).await.unwrap();
        let unknown = categories.iter().find(|c| c.category == "unknown").unwrap();
        assert_eq!(unknown.count, 1);
    }

    #[tokio::test]
    async fn test_top_domains_merge_partly_labeled_rows() {
        let (warehouse, _dir) = create_temp_warehouse().await;
        let batch = vec![
            tracker("pixel.io", "a.com", Some("Pixel Corp"), 1),
            tracker("pixel.io", "b.com", None, 1),
            tracker("pixel.io", "c.com", None, 1),
            tracker("lonely.io", "a.com", None, 1),
        ];
        warehouse.insert_trackers(&batch, "a@b.c", "d").await.unwrap();

        let domains = warehouse.top_domains(&user("a@b.c"), 10).await.unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].domain, "pixel.io");
        assert_eq!(domains[0].count, 3);
        assert_eq!(domains[0].company, "Pixel Corp");
        assert_eq!(domains[1].company, "Unknown");
    }

    #[tokio::test]
    async fn test_company_stats_sum_occurrences() {
        let (warehouse, _dir) = seeded().await;
        let stats = warehouse
            .get_tracker_stats(&user("alice@example.com"))
            .await
            .unwrap();

        let google = stats.iter().find(|s| s.company == "Google LLC").unwrap();
        assert_eq!(google.count, 3);
        assert_eq!(google.total_hits, 8);
        assert!(stats.iter().any(|s| s.company == "Unknown"));
    }

    #[tokio::test]
    async fn test_security_report_data() {
        let (warehouse, _dir) = seeded().await;
        let data = warehouse
            .security_report_data(
                &user("alice@example.com"),
                Utc::now() - Duration::days(7),
                50,
            )
            .await
            .unwrap();

        assert_eq!(data.total_trackers, 4);
        let top = &data.domain_stats[0];
        assert_eq!(top.domain, "doubleclick.net");
        assert_eq!(top.total_hits, 6);
        assert_eq!(top.unique_initiators, 2);
    }

    #[tokio::test]
    async fn test_company_hits_and_monthly_rows() {
        let (warehouse, _dir) = seeded().await;
        let scope = user("alice@example.com");

        let hits = warehouse
            .company_hits_between(&scope, Utc::now() - Duration::days(7), None, Some(5))
            .await
            .unwrap();
        assert_eq!(hits[0].company, "Google LLC");
        assert_eq!(hits[0].total_occurrences, 8);

        let months = warehouse.monthly_tracker_stats(&scope, 7).await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, Utc::now().format("%Y-%m").to_string());
        // 按公司去重，未标注的行不计
        assert_eq!(months[0].unique_trackers, 1);
        assert_eq!(months[0].total_tracking, 12);
    }
}
