use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use streamcheck_core::Channel;
use streamcheck_engine::{ensure_output_dir, write_by_category, write_playlist};

fn channel(name: &str, group: Option<&str>) -> Channel {
    Channel {
        name: name.to_string(),
        url: format!("http://example.test/{}", name.to_lowercase()),
        group: group.map(str::to_string),
        logo: None,
        tvg_id: None,
        tvg_name: None,
    }
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn write_playlist_creates_parent_and_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("working.m3u8");

    write_playlist(&target, &[channel("One", Some("News"))]).unwrap();
    let first = fs::read_to_string(&target).unwrap();
    assert!(first.contains(",One"));

    write_playlist(&target, &[channel("Two", None)]).unwrap();
    let second = fs::read_to_string(&target).unwrap();
    assert!(second.contains(",Two"));
    assert!(!second.contains(",One"));
}

#[test]
fn write_playlist_fails_cleanly_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let target = blocker.join("working.m3u8");
    assert!(write_playlist(&target, &[channel("One", None)]).is_err());
    assert!(!target.exists());
}

#[test]
fn split_by_category_writes_one_file_per_group() {
    let temp = TempDir::new().unwrap();
    let channels = vec![
        channel("CNN", Some("News")),
        channel("ESPN", Some("Sports")),
        channel("BBC", Some("News")),
        channel("Mystery", None),
    ];

    let written = write_by_category(temp.path(), &channels).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["news.m3u8", "sports.m3u8", "uncategorized.m3u8"]);

    let news = fs::read_to_string(temp.path().join("news.m3u8")).unwrap();
    assert!(news.contains(",CNN"));
    assert!(news.contains(",BBC"));
    assert!(!news.contains(",ESPN"));
}

#[test]
fn colliding_category_slugs_are_last_write_wins() {
    let temp = TempDir::new().unwrap();
    let channels = vec![
        channel("First", Some("News!")),
        channel("Second", Some("News?")),
    ];

    let written = write_by_category(temp.path(), &channels).unwrap();
    // Both groups slug to the same stem; the path is reported once.
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].file_name().unwrap(), "news.m3u8");

    let content = fs::read_to_string(&written[0]).unwrap();
    assert!(content.contains(",Second"));
    assert!(!content.contains(",First"));
}
