//! Integration tests for the shelf store
//!
//! Exercises book/chart consistency through the public API: every live book
//! keeps exactly three charts, updates keep chart identity and buckets,
//! deletes leave no orphans and failed writes leave nothing behind.

use bookhub_core::clock::FixedClock;
use bookhub_core::storage::{
    BookRef, BookStatus, ChartLabel, Database, NewBook, NewUser, ShelfRepository,
};
use bookhub_core::{Library, Record};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

const OWNER: &str = "c0cc3f0c-9a02-45ba-9de7-7d7276bb6058";
const OTHER: &str = "7e1bd0d6-44c1-4c35-9a41-3d0b5b1e2f10";

async fn library_with_owners() -> Library {
    let db = Database::new_in_memory().await.expect("Failed to create database");
    let library = Library::new(db, Arc::new(FixedClock::default()));
    for (external_id, email) in [(OWNER, "owner@example.com"), (OTHER, "other@example.com")] {
        library
            .register_user(NewUser::new(
                external_id.to_string(),
                "Reader".to_string(),
                email.to_string(),
            ))
            .await
            .expect("Failed to register owner");
    }
    library
}

fn book(owner: &str, price: i64, page: i64, status: BookStatus) -> NewBook {
    NewBook::new(owner.to_string(), "Yogisha X no Kenshin".to_string(), status)
        .with_author("Higashino Keigo")
        .with_isbn10("4167110121")
        .with_price(price)
        .with_page(page)
}

#[tokio::test]
async fn every_created_book_has_one_chart_per_label() {
    let library = library_with_owners().await;

    for price in [0, 980, 1640] {
        let created = library
            .create_book_with_charts(book(OWNER, price, 247, BookStatus::Bought))
            .await
            .expect("Failed to create book");

        let charts = library.shelf().charts_for_book(created.id).await.unwrap();
        assert_eq!(charts.len(), 3);
        for label in ChartLabel::ALL {
            assert_eq!(charts.iter().filter(|c| c.label == label).count(), 1);
        }
        assert!(charts.iter().all(|c| c.book_id == created.id && c.owner_id == OWNER));
    }
}

#[tokio::test]
async fn update_keeps_chart_identity_and_bucket() {
    let library = library_with_owners().await;
    let created = library
        .create_book_with_charts(book(OWNER, 980, 247, BookStatus::Bought))
        .await
        .unwrap();
    let before = library.shelf().charts_for_book(created.id).await.unwrap();

    let mut edited = created.clone();
    edited.price = 1320;
    edited.page = 384;
    edited.status = BookStatus::Read;
    library.update_book_with_charts(edited).await.expect("Failed to update book");

    let after = library.shelf().charts_for_book(created.id).await.unwrap();
    assert_eq!(after.len(), 3);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!((old.id, old.label, old.year, old.month), (new.id, new.label, new.year, new.month));
        let expected = match new.label {
            ChartLabel::Price => 1320,
            ChartLabel::Volumes => 1,
            ChartLabel::Pages => 384,
        };
        assert_eq!(new.value, expected);
    }
}

#[tokio::test]
async fn delete_leaves_no_orphan_charts() {
    let library = library_with_owners().await;
    let mine = library
        .create_book_with_charts(book(OWNER, 980, 247, BookStatus::Read))
        .await
        .unwrap();
    let theirs = library
        .create_book_with_charts(book(OTHER, 1500, 600, BookStatus::Read))
        .await
        .unwrap();

    assert_eq!(library.delete_books_with_charts(&[mine.to_ref()]).await.unwrap(), 1);
    assert!(library.shelf().charts_for_book(mine.id).await.unwrap().is_empty());
    assert!(library.find_charts_by_owner(OWNER).await.unwrap().is_empty());

    // Deleting again is NotFound and leaves other owners alone
    let err = library
        .delete_books_with_charts(&[mine.to_ref()])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(library.shelf().charts_for_book(theirs.id).await.unwrap().len(), 3);
    assert_eq!(library.find_charts_by_owner(OTHER).await.unwrap().len(), 3);
}

#[tokio::test]
async fn failed_chart_insert_rolls_back_the_book() {
    let library = library_with_owners().await;

    sqlx::query(
        "CREATE TRIGGER reject_charts BEFORE INSERT ON charts BEGIN SELECT RAISE(ABORT, 'charts disabled'); END;",
    )
    .execute(library.database().pool())
    .await
    .expect("Failed to create trigger");

    let err = library
        .create_book_with_charts(book(OWNER, 980, 247, BookStatus::Bought))
        .await
        .unwrap_err();
    assert_eq!(err.failed_step(), Some("insert charts"));

    assert!(library.find_books_by_owner(OWNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn charts_group_by_month_in_label_order() {
    let library = library_with_owners().await;
    library
        .create_book_with_charts(book(OWNER, 980, 247, BookStatus::Read))
        .await
        .unwrap();
    library
        .create_book_with_charts(book(OWNER, 980, 247, BookStatus::Bought))
        .await
        .unwrap();

    let points = library.find_charts_by_owner(OWNER).await.unwrap();
    let summary: Vec<(ChartLabel, i32, i32, i64)> = points
        .iter()
        .map(|p| (p.label, p.year, p.month, p.value))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChartLabel::Price, 2024, 2, 1960),
            (ChartLabel::Volumes, 2024, 2, 2),
            (ChartLabel::Pages, 2024, 2, 494),
        ]
    );
}

#[tokio::test]
async fn record_matches_stored_books() {
    let library = library_with_owners().await;
    let fixture = [
        (1640, 330, BookStatus::Read),
        (770, 234, BookStatus::Reading),
        (0, 49, BookStatus::Bought),
        (1240, 890, BookStatus::Read),
        (220, 220, BookStatus::Bought),
    ];
    for (price, page, status) in fixture {
        library
            .create_book_with_charts(book(OWNER, price, page, status))
            .await
            .unwrap();
    }

    let record = library.record_for_owner(OWNER).await.unwrap();
    assert_eq!(
        record,
        Record {
            total_cost: 3870,
            total_cost_read: 2880,
            total_volumes: 5,
            total_volumes_read: 2,
            total_pages: 1723,
            total_pages_read: 1220,
        }
    );
}

#[tokio::test]
async fn removing_a_user_clears_their_shelf() {
    let library = library_with_owners().await;
    let created = library
        .create_book_with_charts(book(OWNER, 980, 247, BookStatus::Read))
        .await
        .unwrap();
    library
        .create_book_with_charts(book(OTHER, 500, 100, BookStatus::Read))
        .await
        .unwrap();

    library.remove_user(OWNER).await.expect("Failed to remove user");

    assert!(library.find_books_by_owner(OWNER).await.unwrap().is_empty());
    assert!(library.shelf().charts_for_book(created.id).await.unwrap().is_empty());
    assert_eq!(library.find_books_by_owner(OTHER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_creates_on_disk_keep_every_chart_set() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new(dir.path().join("bookhub.db")).await?;
    let instant = Utc.with_ymd_and_hms(2024, 2, 5, 14, 43, 0).unwrap();
    let library = Library::new(db, Arc::new(FixedClock::new(instant)));
    library
        .register_user(NewUser::new(
            OWNER.to_string(),
            "Reader".to_string(),
            "owner@example.com".to_string(),
        ))
        .await?;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let library = library.clone();
        tasks.push(tokio::spawn(async move {
            library
                .create_book_with_charts(book(OWNER, 100 * i, 10 * i, BookStatus::Bought))
                .await
        }));
    }
    let mut refs: Vec<BookRef> = Vec::new();
    for task in tasks {
        refs.push(task.await??.to_ref());
    }

    let books = library.find_books_by_owner(OWNER).await?;
    assert_eq!(books.len(), 8);
    for b in &books {
        assert_eq!(library.shelf().charts_for_book(b.id).await?.len(), 3);
    }

    assert_eq!(library.delete_books_with_charts(&refs).await?, 8);
    assert!(library.find_charts_by_owner(OWNER).await?.is_empty());
    Ok(())
}
