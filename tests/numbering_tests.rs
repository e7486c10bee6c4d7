//! Filesystem tests for frame numbering: continuation, renumbering and stats.

mod common;

use common::write_frame;
use scrollshot::numbering::{
    folder_stats, list_frames, next_number, renumber_contiguous, FramePattern, RenumberOutcome,
};
use tempfile::TempDir;

fn numbers(dir: &std::path::Path) -> Vec<u32> {
    list_frames(dir, "BC", "Shopee")
        .unwrap()
        .iter()
        .map(|f| f.number)
        .collect()
}

// === next_number ===

#[test]
fn test_next_number_empty_dir_is_one() {
    let dir = TempDir::new().unwrap();
    assert_eq!(next_number(dir.path(), "BC", "Shopee"), 1);
}

#[test]
fn test_next_number_missing_dir_is_one() {
    let dir = TempDir::new().unwrap();
    assert_eq!(next_number(&dir.path().join("absent"), "BC", "Shopee"), 1);
}

#[test]
fn test_next_number_ignores_gaps() {
    let dir = TempDir::new().unwrap();
    for n in [1, 2, 5] {
        write_frame(dir.path(), &format!("{:02}_BC_Shopee.png", n), b"x");
    }
    assert_eq!(next_number(dir.path(), "BC", "Shopee"), 6);
}

#[test]
fn test_next_number_ignores_other_branches_and_files() {
    let dir = TempDir::new().unwrap();
    write_frame(dir.path(), "03_BC_Shopee.png", b"x");
    write_frame(dir.path(), "40_LVT_Shopee.png", b"x");
    write_frame(dir.path(), "50_BC_Grab.png", b"x");
    write_frame(dir.path(), "notes.txt", b"x");
    assert_eq!(next_number(dir.path(), "BC", "Shopee"), 4);
}

#[test]
fn test_next_number_uses_numeric_not_lexical_max() {
    let dir = TempDir::new().unwrap();
    write_frame(dir.path(), "99_BC_Shopee.png", b"x");
    write_frame(dir.path(), "100_BC_Shopee.png", b"x");
    assert_eq!(next_number(dir.path(), "BC", "Shopee"), 101);
}

// === renumber_contiguous ===

#[test]
fn test_renumber_closes_gaps_preserving_order() {
    let dir = TempDir::new().unwrap();
    write_frame(dir.path(), "02_BC_Shopee.png", b"second");
    write_frame(dir.path(), "07_BC_Shopee.png", b"third");
    write_frame(dir.path(), "120_BC_Shopee.png", b"fourth");
    write_frame(dir.path(), "01_BC_Shopee.png", b"first");

    let outcome = renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    assert_eq!(outcome, RenumberOutcome { renamed: 2, total: 4 });
    assert_eq!(numbers(dir.path()), vec![1, 2, 3, 4]);

    let read = |name: &str| std::fs::read(dir.path().join(name)).unwrap();
    assert_eq!(read("01_BC_Shopee.png"), b"first");
    assert_eq!(read("02_BC_Shopee.png"), b"second");
    assert_eq!(read("03_BC_Shopee.png"), b"third");
    assert_eq!(read("04_BC_Shopee.png"), b"fourth");
}

#[test]
fn test_renumber_arbitrary_numbers() {
    let dir = TempDir::new().unwrap();
    let originals = [5u32, 9, 13, 42, 1000];
    for n in originals {
        write_frame(dir.path(), &format!("{:02}_BC_Shopee.png", n), n.to_string().as_bytes());
    }

    renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    assert_eq!(numbers(dir.path()), vec![1, 2, 3, 4, 5]);
    for (rank, original) in originals.iter().enumerate() {
        let name = format!("{:02}_BC_Shopee.png", rank + 1);
        let content = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(content, original.to_string());
    }
}

#[test]
fn test_renumber_contiguous_set_is_noop() {
    let dir = TempDir::new().unwrap();
    for n in 1..=3 {
        write_frame(dir.path(), &format!("{:02}_BC_Shopee.png", n), b"x");
    }

    let outcome = renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    assert_eq!(outcome, RenumberOutcome { renamed: 0, total: 3 });
    assert_eq!(numbers(dir.path()), vec![1, 2, 3]);
}

#[test]
fn test_renumber_twice_second_pass_is_noop() {
    let dir = TempDir::new().unwrap();
    for n in [3, 8, 11] {
        write_frame(dir.path(), &format!("{:02}_BC_Shopee.png", n), b"x");
    }
    renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    let second = renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    assert_eq!(second, RenumberOutcome { renamed: 0, total: 3 });
}

#[test]
fn test_renumber_leaves_unmatched_files_alone() {
    let dir = TempDir::new().unwrap();
    write_frame(dir.path(), "05_BC_Shopee.png", b"x");
    write_frame(dir.path(), "09_LVT_Shopee.png", b"y");
    write_frame(dir.path(), "cover.png", b"z");

    renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    assert!(dir.path().join("01_BC_Shopee.png").exists());
    assert!(dir.path().join("09_LVT_Shopee.png").exists());
    assert!(dir.path().join("cover.png").exists());
}

#[test]
fn test_renumber_skips_blocked_target_and_continues() {
    let dir = TempDir::new().unwrap();
    for n in [5, 7, 9] {
        write_frame(dir.path(), &format!("{:02}_BC_Shopee.png", n), format!("f{}", n).as_bytes());
    }
    // A directory squatting on the second target name.
    std::fs::create_dir(dir.path().join("02_BC_Shopee.png")).unwrap();

    let outcome = renumber_contiguous(dir.path(), "BC", "Shopee").unwrap();
    assert_eq!(outcome, RenumberOutcome { renamed: 2, total: 3 });

    assert_eq!(numbers(dir.path()), vec![1, 3, 7]);
    let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
    assert_eq!(read("01_BC_Shopee.png"), "f5");
    assert_eq!(read("07_BC_Shopee.png"), "f7");
    assert_eq!(read("03_BC_Shopee.png"), "f9");
    assert!(dir.path().join("02_BC_Shopee.png").is_dir());
}

#[test]
fn test_renumber_empty_and_missing_dirs() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        renumber_contiguous(dir.path(), "BC", "Shopee").unwrap(),
        RenumberOutcome::default()
    );
    assert_eq!(
        renumber_contiguous(&dir.path().join("absent"), "BC", "Shopee").unwrap(),
        RenumberOutcome::default()
    );
}

// === folder_stats ===

#[test]
fn test_folder_stats_counts_size_and_holes() {
    let dir = TempDir::new().unwrap();
    write_frame(dir.path(), "01_BC_Shopee.png", &[0u8; 1000]);
    write_frame(dir.path(), "02_BC_Shopee.png", &[0u8; 500]);
    write_frame(dir.path(), "06_BC_Shopee.png", &[0u8; 24]);
    write_frame(dir.path(), "readme.md", &[0u8; 4096]);

    let stats = folder_stats(dir.path(), "BC", "Shopee").unwrap();
    assert_eq!(stats.file_count, 3);
    assert_eq!(stats.total_bytes, 1524);
    assert_eq!(stats.missing_count, 3);
}

#[test]
fn test_folder_stats_missing_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    let stats = folder_stats(&dir.path().join("absent"), "BC", "Shopee").unwrap();
    assert_eq!(stats.file_count, 0);
    assert_eq!(stats.missing_count, 0);
}

// === scan ===

#[test]
fn test_scan_sorts_numerically() {
    let dir = TempDir::new().unwrap();
    for n in [10, 9, 100, 1] {
        write_frame(dir.path(), &format!("{:02}_BC_Shopee.png", n), b"x");
    }
    let pattern = FramePattern::new("BC", "Shopee");
    let names: Vec<String> = pattern
        .scan(dir.path())
        .unwrap()
        .into_iter()
        .map(|f| f.file_name)
        .collect();
    assert_eq!(
        names,
        vec![
            "01_BC_Shopee.png",
            "09_BC_Shopee.png",
            "10_BC_Shopee.png",
            "100_BC_Shopee.png"
        ]
    );
}

#[test]
fn test_scan_skips_directories() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("03_BC_Shopee.png")).unwrap();
    write_frame(dir.path(), "04_BC_Shopee.png", b"x");
    assert_eq!(numbers(dir.path()), vec![4]);
}
