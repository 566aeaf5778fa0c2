use std::fs;
use std::path::Path;

use reqlabel::tools::{self, IdOptions, SampleOptions};
use reqlabel::{LabelContext, build_annotator, label_file};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

fn dictionaries(root: &Path) -> std::path::PathBuf {
    let dir = root.join("NewDict");
    fs::create_dir(&dir).unwrap();
    write(&dir, "adj.txt", "quick\n");
    write(&dir, "vague.txt", "user friendly\n");
    write(&dir, "vpastp.txt", "stored\n");
    write(&dir, "verb.txt", "store\n");
    dir
}

fn run_label(root: &Path, dataset: &str) -> String {
    let dict = dictionaries(root);
    let input = root.join("Dataset_With_R_ID.txt");
    let output = root.join("Labeled_Dataset.csv");
    fs::write(&input, dataset).unwrap();

    let ctx = LabelContext::load(&dict, None).unwrap();
    let annotator = build_annotator(&ctx, None, None).unwrap();
    label_file(&ctx, annotator.as_ref(), &input, &output).unwrap();
    fs::read_to_string(output).unwrap()
}

#[test]
fn labels_a_dataset_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_label(
        dir.path(),
        "R1: 1,'The quick fox jumps',FR\n\
         R2: 1,'The system shall be user-friendly',NFR\n\
         R3: 2,'The data shall be stored',FR\n\
         R4: 2,'Nothing to see',O\n\
         R5: 1,'Make it user-friendly',NFR\n",
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ID;ID progetto;REQUISITO (testo);Classe dei requisiti;CATEGORIA;PAROLA",
            "R1;1;The quick fox jumps;FR;adj;quick",
            "R2;1;The system shall be user-friendly;NFR;vague;user-friendly",
            "R3;2;The data shall be stored;FR;vpastp;stored",
            "R4;2;Nothing to see;O;NULL;NULL",
            "R5;1;Make it user-friendly;NFR;vague;user-friendly",
        ]
    );
}

#[test]
fn raw_requirements_go_through_ids_labeling_and_split() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let raw = root.join("Dataset.arff");
    fs::write(
        &raw,
        "@relation requirements\n% generated\n1,'The quick fox jumps',FR\nR9: 1,'Quick and user friendly',US\n",
    )
    .unwrap();
    let tagged = root.join("tagged.txt");
    let written = tools::assign_ids_file(&raw, &tagged, &IdOptions::default()).unwrap();
    assert_eq!(written, 2);
    let dataset = fs::read_to_string(&tagged).unwrap();
    assert_eq!(
        dataset,
        "R1: 1,'The quick fox jumps',FR\nR9: 1,'Quick and user friendly',US\n"
    );

    let out = run_label(root, &dataset);
    assert!(out.contains("R9;1;Quick and user friendly;US;vague;user friendly\n"));

    let labeled = root.join("Labeled_Dataset.csv");
    let sorted = root.join("Sorted_by_Categories");
    let stats = tools::split_by_category(&labeled, &sorted).unwrap();
    assert_eq!(stats.categories.get("vague"), Some(&1));
    let vague = fs::read_to_string(sorted.join("vague_requirements.csv")).unwrap();
    assert!(vague.starts_with("ID;ID progetto;REQUISITO (testo);"));
    assert_eq!(vague.lines().count(), 2);
    assert!(sorted.join("adj_requirements.csv").exists());
    assert!(!sorted.join("null_requirements.csv").exists());

    let sample = root.join("Requisiti_Selezionati.csv");
    let options = SampleOptions {
        sample_size: 27,
        seed: Some(1),
    };
    let sampled = tools::sample_dir(&sorted, &sample, &options).unwrap();
    assert_eq!(sampled.files, stats.files_written);
    let text = fs::read_to_string(sample).unwrap();
    assert_eq!(text.lines().count(), 1 + sampled.rows);
}

#[test]
fn merged_word_list_loads_as_a_category() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "Vague_1.txt", "Easy\nfast\n");
    write(root, "Vagues_2.txt", "fast\nas needed\n");
    let dict = root.join("dict");
    fs::create_dir(&dict).unwrap();

    let report = tools::merge_word_lists(
        &root.join("Vague_1.txt"),
        &root.join("Vagues_2.txt"),
        &dict.join("vague.txt"),
        &root.join("report.txt"),
    )
    .unwrap();
    assert_eq!(report.union.len(), 3);
    assert_eq!(
        fs::read_to_string(dict.join("vague.txt")).unwrap(),
        "as needed\neasy\nfast\n"
    );
    assert!(
        fs::read_to_string(root.join("report.txt"))
            .unwrap()
            .contains("33.33%")
    );

    let ctx = LabelContext::load(&dict, None).unwrap();
    let stats = &ctx.dictionary.categories()["vague"];
    assert_eq!((stats.words, stats.phrases), (2, 1));
}
