use std::fs;

use reqlabel_dict::{CategoryStats, Dictionary};

fn write(dir: &std::path::Path, name: &str, contents: &[u8]) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

#[test]
fn loads_one_category_per_txt_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Adj.txt", b"quick\n\nslow\n");
    write(dir.path(), "vague.txt", b"user friendly\nas_needed\nquick\n");
    write(dir.path(), "notes.md", b"ignored\n");

    let dict = Dictionary::load(dir.path());

    let names: Vec<&str> = dict.categories().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["adj", "vague"]);
    assert_eq!(
        dict.categories()["adj"],
        CategoryStats {
            words: 2,
            phrases: 0
        }
    );
    assert_eq!(
        dict.categories()["vague"],
        CategoryStats {
            words: 1,
            phrases: 2
        }
    );

    let quick = dict.singles().categories("quick").expect("quick indexed");
    assert!(quick.contains("adj") && quick.contains("vague"));
    assert!(dict.singles().categories("ignored").is_none());
    assert!(dict.phrases().categories("As Needed").is_some());
}

#[test]
fn missing_directory_yields_empty_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let dict = Dictionary::load(dir.path().join("nope"));
    assert!(dict.is_empty());
    assert!(dict.categories().is_empty());
}

#[test]
fn directory_without_txt_files_yields_empty_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "readme.csv", b"quick\n");
    assert!(Dictionary::load(dir.path()).is_empty());
}

#[test]
fn unreadable_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.txt", &[0xff, 0xfe, b'\n', 0xc3]);
    write(dir.path(), "adj.txt", b"quick\n");

    let dict = Dictionary::load(dir.path());

    assert!(!dict.categories().contains_key("broken"));
    assert!(dict.singles().contains("quick"));
}

#[test]
fn found_phrases_point_into_the_original_text() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "vague.txt", b"user friendly\n");
    let dict = Dictionary::load(dir.path());

    let text = "Make it user-friendly";
    let found = dict.phrases().find_phrases(text);
    assert_eq!(found.len(), 1);
    assert_eq!(&text[found[0].span()], "user-friendly");
    assert_eq!(found[0].category, "vague");
}
