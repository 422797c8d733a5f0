/*!
 * Tests for projtree scanning and reporting
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::{tempdir, TempDir};

use crate::classify::FileClassifier;
use crate::config::Config;
use crate::error::ProjtreeError;
use crate::report::{search_hits, Reporter, TreeStyle};
use crate::scanner::{ScanOptions, Scanner};
use crate::tokenizer::{create_tokenizer, Model};
use crate::types::{DumpRecord, FileKind};
use crate::writer::JsonWriter;

fn config_for(root: &Path) -> Config {
    Config {
        target_dir: root.to_path_buf(),
        ignore_patterns: vec![],
        gitignore_path: None,
        model: Model::Gpt4,
        num_threads: 1,
        dump_file: None,
    }
}

fn scanner_for(config: Config) -> Scanner {
    let matcher = config.ignore_matcher().unwrap();
    Scanner::new(config, matcher, Arc::new(ProgressBar::hidden()))
        .with_tokenizer(create_tokenizer(Model::Gpt4).unwrap())
}

fn scanner(root: &Path) -> Scanner {
    scanner_for(config_for(root))
}

fn tokens_only() -> ScanOptions {
    ScanOptions {
        count_tokens: true,
        ..ScanOptions::default()
    }
}

// proj/{a.txt, b.bin, sub/c.txt} with a .gitignore excluding b.bin
fn setup_project() -> io::Result<(TempDir, PathBuf)> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("proj");
    fs::create_dir_all(root.join("sub"))?;

    fs::write(root.join("a.txt"), "hello world")?;
    fs::write(root.join("sub").join("c.txt"), "x")?;

    let mut bin_file = File::create(root.join("b.bin"))?;
    let bytes: Vec<u8> = (0..500u32).map(|i| (i % 7) as u8).collect();
    bin_file.write_all(&bytes)?;

    fs::write(root.join(".gitignore"), "b.bin\n")?;

    Ok((temp_dir, root))
}

// A deeper tree with a build/ directory excluded by the root .gitignore
fn setup_nested_project() -> io::Result<(TempDir, PathBuf)> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("nested");

    fs::create_dir_all(root.join("src").join("util"))?;
    fs::create_dir_all(root.join("build").join("deep").join("deeper"))?;
    fs::create_dir_all(root.join("docs"))?;

    fs::write(root.join("README.md"), "# Nested\n\nA project with NEEDLE once.\n")?;
    fs::write(
        root.join("src").join("main.rs"),
        "fn main() {\n    println!(\"NEEDLE NEEDLE NEEDLE\");\n}\n",
    )?;
    fs::write(
        root.join("src").join("util").join("mod.rs"),
        "pub fn helper() -> usize {\n    42\n}\n",
    )?;
    fs::write(root.join("docs").join("guide.txt"), "Read the code.\n")?;
    fs::write(
        root.join("build").join("deep").join("deeper").join("artifact.txt"),
        "NEEDLE hidden in build output\n",
    )?;
    fs::write(root.join("docs").join("logo.png"), [0x89u8, b'P', b'N', b'G', 0, 0, 0, 13])?;

    fs::write(root.join(".gitignore"), "build/\n")?;

    Ok((temp_dir, root))
}

#[test]
fn test_token_overview_scenario() -> io::Result<()> {
    let (_temp_dir, root) = setup_project()?;

    let result = scanner(&root).scan(&tokens_only()).unwrap();
    let style = TreeStyle {
        tokens: true,
        content: false,
    };
    let report = Reporter::new(style).render_tree(&result.root);

    assert_eq!(
        report,
        "proj/\n\
         \x20   a.txt - 2 tokens\n\
         \x20   sub/\n\
         \x20       c.txt - 1 tokens\n\
         \x20   Total tokens in folder: 1\n\
         Total tokens in folder: 3\n"
    );
    assert_eq!(result.total_tokens, 3);
    assert_eq!(result.root.dirs[0].total_tokens, 1);

    Ok(())
}

#[test]
fn test_structure_listing() -> io::Result<()> {
    let (_temp_dir, root) = setup_project()?;
    fs::write(root.join("sub").join("image.bin"), [0u8, 1, 2, 3])?;

    let result = scanner(&root).scan(&ScanOptions::structure()).unwrap();
    let report = Reporter::new(TreeStyle::default()).render_tree(&result.root);

    // Binary files are still named in plain listings, ignored ones are not
    assert_eq!(
        report,
        "proj/\n    a.txt\n    sub/\n        c.txt\n        image.bin\n"
    );
    assert!(result.root.walk_files().all(|file| file.kind.is_none()));

    Ok(())
}

#[test]
fn test_binary_files_skip_content_reports() -> io::Result<()> {
    let (_temp_dir, root) = setup_project()?;
    fs::write(root.join("sub").join("image.bin"), [0u8, 1, 2, 3])?;

    let result = scanner(&root).scan(&tokens_only()).unwrap();
    let image = result
        .root
        .walk_files()
        .find(|file| file.name == "image.bin")
        .unwrap();
    assert_eq!(image.kind, Some(FileKind::Binary));
    assert_eq!(image.tokens, None);

    let style = TreeStyle {
        tokens: true,
        content: false,
    };
    let report = Reporter::new(style).render_tree(&result.root);
    assert!(!report.contains("image.bin"));
    assert_eq!(result.total_tokens, 3);

    Ok(())
}

#[test]
fn test_content_overview() -> io::Result<()> {
    let (_temp_dir, root) = setup_project()?;

    let options = ScanOptions {
        keep_content: true,
        ..ScanOptions::default()
    };
    let result = scanner(&root).scan(&options).unwrap();
    let style = TreeStyle {
        tokens: false,
        content: true,
    };
    let report = Reporter::new(style).render_tree(&result.root);

    assert_eq!(
        report,
        "proj/\n\
         \x20   a.txt\n\
         \x20   Contents:\n\
         \x20   hello world\n\
         \x20   sub/\n\
         \x20       c.txt\n\
         \x20       Contents:\n\
         \x20       x\n"
    );

    Ok(())
}

#[test]
fn test_tokens_and_content_overview() -> io::Result<()> {
    let (_temp_dir, root) = setup_project()?;

    let options = ScanOptions {
        count_tokens: true,
        keep_content: true,
        ..ScanOptions::default()
    };
    let result = scanner(&root).scan(&options).unwrap();
    let style = TreeStyle {
        tokens: true,
        content: true,
    };
    let report = Reporter::new(style).render_tree(&result.root);

    assert_eq!(
        report,
        "proj/\n\
         \x20   a.txt - 2 tokens\n\
         \x20   Contents:\n\
         \x20   hello world\n\
         \x20   sub/\n\
         \x20       c.txt - 1 tokens\n\
         \x20       Contents:\n\
         \x20       x\n\
         \x20   Total tokens in folder: 1\n\
         Total tokens in folder: 3\n"
    );

    Ok(())
}

#[test]
fn test_total_is_sum_of_eligible_files() -> io::Result<()> {
    let (_temp_dir, root) = setup_nested_project()?;

    let result = scanner(&root).scan(&tokens_only()).unwrap();
    let sum: usize = result
        .root
        .walk_files()
        .filter(|file| file.is_eligible())
        .filter_map(|file| file.tokens)
        .sum();

    assert!(sum > 0);
    assert_eq!(result.total_tokens, sum);
    for dir in &result.root.dirs {
        let dir_sum: usize = dir.walk_files().filter_map(|file| file.tokens).sum();
        assert_eq!(dir.total_tokens, dir_sum);
    }

    Ok(())
}

#[test]
fn test_excluded_directory_never_appears() -> io::Result<()> {
    let (_temp_dir, root) = setup_nested_project()?;

    let options = ScanOptions {
        count_tokens: true,
        keep_content: true,
        largest: 10,
        collect_dump: true,
        pattern: Some("NEEDLE".to_string()),
    };
    let result = scanner(&root).scan(&options).unwrap();

    let report = Reporter::new(TreeStyle::default()).render_tree(&result.root);
    assert!(!report.contains("build"));
    assert!(!report.contains("artifact.txt"));

    let hits: Vec<_> = search_hits(&result.root)
        .map(|file| file.path.clone())
        .collect();
    assert_eq!(
        hits,
        vec![PathBuf::from("README.md"), PathBuf::from("src/main.rs")]
    );

    assert!(result.dump.iter().all(|record| !record.path.contains("/build/")));
    assert!(result
        .largest
        .iter()
        .all(|file| !file.path.starts_with("build")));

    Ok(())
}

#[test]
fn test_rules_with_slashes_apply_to_nested_files() -> io::Result<()> {
    let (_temp_dir, root) = setup_nested_project()?;
    fs::write(root.join(".gitignore"), "src/util/mod.rs\n")?;

    let result = scanner(&root).scan(&ScanOptions::structure()).unwrap();
    let names: Vec<_> = result.root.walk_files().map(|f| f.path.clone()).collect();

    assert!(!names.contains(&PathBuf::from("src/util/mod.rs")));
    assert!(names.contains(&PathBuf::from("src/main.rs")));
    // build/ is no longer ignored
    assert!(names.contains(&PathBuf::from("build/deep/deeper/artifact.txt")));

    Ok(())
}

#[test]
fn test_largest_files() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("nested"))?;
    fs::write(root.join("one.txt"), "x")?;
    fs::write(root.join("tie.txt"), "y")?;
    fs::write(root.join("long.txt"), "the quick brown fox jumps over the lazy dog")?;
    fs::write(root.join("nested").join("mid.txt"), "hello world again")?;

    let options = ScanOptions {
        largest: 3,
        ..ScanOptions::default()
    };
    let result = scanner(root).scan(&options).unwrap();

    assert_eq!(result.largest.len(), 3);
    assert!(result
        .largest
        .windows(2)
        .all(|pair| pair[0].tokens >= pair[1].tokens));
    assert_eq!(result.largest[0].path, PathBuf::from("long.txt"));
    assert_eq!(result.largest[1].path, PathBuf::from("nested/mid.txt"));
    // Equal counts keep discovery order: one.txt is listed before tie.txt
    assert_eq!(result.largest[2].path, PathBuf::from("one.txt"));

    let all: Vec<_> = result
        .root
        .walk_files()
        .map(|file| (file.path.clone(), file.tokens))
        .collect();
    for large in &result.largest {
        assert!(all.contains(&(large.path.clone(), Some(large.tokens))));
    }

    // Asking for more than exist returns everything
    let options = ScanOptions {
        largest: 10,
        ..ScanOptions::default()
    };
    assert_eq!(scanner(root).scan(&options).unwrap().largest.len(), 4);

    Ok(())
}

#[test]
fn test_dump_round_trip() -> io::Result<()> {
    let (temp_dir, root) = setup_nested_project()?;
    // Pushes this file over a tiny size ceiling
    fs::write(root.join("docs").join("big.txt"), "x".repeat(64))?;

    let options = ScanOptions {
        collect_dump: true,
        ..ScanOptions::default()
    };
    let result = scanner(&root)
        .with_classifier(FileClassifier::new(60))
        .scan(&options)
        .unwrap();

    let output = temp_dir.path().join("out.json");
    let count = JsonWriter::new(&output).write(&result.dump).unwrap();
    assert_eq!(count, 4);

    let parsed: Vec<DumpRecord> =
        serde_json::from_str(&fs::read_to_string(&output)?).unwrap();
    assert_eq!(parsed.len(), 4);

    let canonical_root = fs::canonicalize(&root)?;
    let expected = [
        "README.md",
        "docs/guide.txt",
        "src/main.rs",
        "src/util/mod.rs",
    ];
    for (record, rel) in parsed.iter().zip(expected) {
        let abs = canonical_root.join(rel);
        assert_eq!(record.path, abs.to_string_lossy());
        assert_eq!(record.contents, fs::read_to_string(&abs)?);
        assert!(!record.mime_type.is_empty());
    }

    // Contents are handed over to the dump, not kept on the nodes
    assert!(result.root.walk_files().all(|file| file.content.is_none()));

    Ok(())
}

#[test]
fn test_dump_target_inside_root_is_skipped() -> io::Result<()> {
    let (_temp_dir, root) = setup_project()?;
    fs::write(root.join("dump.json"), "[]")?;

    let config = Config {
        dump_file: Some(root.join("dump.json")),
        ..config_for(&root)
    };
    let options = ScanOptions {
        collect_dump: true,
        ..ScanOptions::default()
    };
    let result = scanner_for(config).scan(&options).unwrap();

    assert!(result.root.files.iter().all(|file| file.name != "dump.json"));
    assert_eq!(result.dump.len(), 2);

    Ok(())
}

#[test]
fn test_search_lists_file_once() -> io::Result<()> {
    let (_temp_dir, root) = setup_nested_project()?;

    let result = scanner(&root).scan(&ScanOptions::search("NEEDLE")).unwrap();
    let hits: Vec<_> = search_hits(&result.root).collect();

    let main_hits = hits
        .iter()
        .filter(|file| file.path == Path::new("src/main.rs"))
        .count();
    assert_eq!(main_hits, 1);

    Ok(())
}

#[test]
fn test_search_does_not_keep_contents() -> io::Result<()> {
    let (_temp_dir, root) = setup_nested_project()?;

    let result = scanner(&root).scan(&ScanOptions::search("NEEDLE")).unwrap();

    assert!(result.root.walk_files().all(|file| file.content.is_none()));
    let hits: Vec<_> = search_hits(&result.root).map(|f| f.path.clone()).collect();
    assert_eq!(
        hits,
        vec![PathBuf::from("README.md"), PathBuf::from("src/main.rs")]
    );

    Ok(())
}

#[test]
fn test_undecodable_utf8_falls_back() -> io::Result<()> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("legacy.txt"), b"na\xefve")?;

    let result = scanner(temp_dir.path())
        .scan(&ScanOptions::search("naïve"))
        .unwrap();
    let hits: Vec<_> = search_hits(&result.root).collect();
    assert_eq!(hits.len(), 1);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_inaccessible_directory_is_reported() -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let (_temp_dir, root) = setup_project()?;
    let locked = root.join("locked");
    fs::create_dir(&locked)?;
    fs::write(locked.join("secret.txt"), "hidden")?;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    let listable = fs::read_dir(&locked).is_ok();
    let result = scanner(&root).scan(&tokens_only());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
    let result = result.unwrap();

    // Root can list anything, nothing to check there
    if listable {
        return Ok(());
    }

    let locked_node = result
        .root
        .dirs
        .iter()
        .find(|dir| dir.name == "locked")
        .unwrap();
    assert!(locked_node.inaccessible);
    assert_eq!(result.total_tokens, 3);

    let report = Reporter::new(TreeStyle::default()).render_tree(&result.root);
    assert!(report.contains("    locked/\n        [Permission Denied]\n"));

    Ok(())
}

#[test]
fn test_tokens_require_tokenizer() {
    let temp_dir = tempdir().unwrap();
    let config = config_for(temp_dir.path());
    let matcher = config.ignore_matcher().unwrap();
    let scanner = Scanner::new(config, matcher, Arc::new(ProgressBar::hidden()));

    assert!(scanner.scan(&ScanOptions::structure()).is_ok());
    assert!(matches!(
        scanner.scan(&tokens_only()),
        Err(ProjtreeError::Config(_))
    ));
}

#[test]
fn test_progress_cleared_when_scan_fails() {
    let temp_dir = tempdir().unwrap();
    let config = config_for(temp_dir.path());
    let matcher = config.ignore_matcher().unwrap();
    let progress = Arc::new(ProgressBar::hidden());
    let scanner = Scanner::new(config, matcher, Arc::clone(&progress));

    assert!(scanner.scan(&tokens_only()).is_err());
    assert!(progress.is_finished());
}

#[test]
fn test_progress_cleared_when_root_vanishes() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("gone");
    fs::create_dir(&root).unwrap();
    let scanner = scanner(&root);
    fs::remove_dir(&root).unwrap();

    assert!(matches!(
        scanner.scan(&ScanOptions::structure()),
        Err(ProjtreeError::Io(_))
    ));
    assert!(scanner.progress.is_finished());
}
