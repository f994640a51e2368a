//! Annotation rewriter.
//!
//! Two passes produce label files:
//!
//! - **Fresh build** ([`write_fresh_labels`]): raw annotations plus a
//!   [`CategoryTable`] become `<index> <cx> <cy> <w> <h>` lines. Lines are
//!   *appended*, so running the pass twice into the same directory doubles
//!   every file. Clear the directory first if that is not what you want.
//! - **Re-index** ([`reindex_label_dir`]): existing label files are rewritten
//!   through an [`IndexMapping`]. Geometry tokens are copied verbatim and each
//!   output file is replaced, so re-running is idempotent.
//!
//! Unusable records are skipped, logged and listed in the returned
//! [`RewriteReport`]. Only I/O failures and a missing source directory abort
//! the pass; files written before the failure are left in place.

mod report;

pub use report::{RewriteIssue, RewriteIssueCode, RewriteMode, RewriteReport};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TaxolabelError;
use crate::ir::io_yolo::{
    append_label_lines, collect_label_files, format_label_line, label_path_for,
    parse_label_line, rel_string, write_label_file,
};
use crate::ir::{Dataset, Image, ImageId};
use crate::remap::{CategoryTable, IndexMapping, Resolution, UnmappedPolicy};

/// Writes one label line per usable annotation under `labels_dir`.
///
/// Each annotation's box is normalized by its image's size and appended to
/// `labels_dir/<image file name>.txt`, in source order. Annotations whose
/// image or category is unknown, whose image has a zero dimension or whose box
/// is not finite are skipped. Images without annotations get no file.
///
/// Image names are confined to `labels_dir`: a root or `..` is dropped and
/// the image is listed in [`RewriteReport::relocated`].
pub fn write_fresh_labels(
    dataset: &Dataset,
    categories: &CategoryTable,
    labels_dir: &Path,
) -> Result<RewriteReport, TaxolabelError> {
    fs::create_dir_all(labels_dir)?;

    let images: HashMap<ImageId, &Image> = dataset.images.iter().map(|img| (img.id, img)).collect();
    let mut report = RewriteReport::new(RewriteMode::FreshBuild);
    let mut pending: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    let mut relocated: HashSet<ImageId> = HashSet::new();

    for ann in &dataset.annotations {
        report.records_in += 1;

        let Some(image) = images.get(&ann.image_id) else {
            report.add(RewriteIssue::new(
                RewriteIssueCode::MissingImageRef,
                format!("image {} is not listed in the source", ann.image_id),
                ann.describe(),
            ));
            continue;
        };

        let Some(class_index) = categories.index_of(ann.category_id) else {
            report.add(RewriteIssue::new(
                RewriteIssueCode::MissingCategoryRef,
                format!("category {} is not listed in the source", ann.category_id),
                ann.describe(),
            ));
            continue;
        };

        if !image.has_valid_dimensions() {
            report.add(RewriteIssue::new(
                RewriteIssueCode::InvalidImageDimensions,
                format!(
                    "image '{}' has size {}x{}; cannot normalize",
                    image.file_name, image.width, image.height
                ),
                ann.describe(),
            ));
            continue;
        }

        if !ann.bbox.is_finite() {
            report.add(RewriteIssue::new(
                RewriteIssueCode::NonFiniteBox,
                format!("bbox {:?} has a non-finite coordinate", ann.bbox),
                ann.describe(),
            ));
            continue;
        }

        let Some(target) = label_path_for(labels_dir, &image.file_name) else {
            report.add(RewriteIssue::new(
                RewriteIssueCode::UnusableImagePath,
                format!("image file name '{}' has no usable path component", image.file_name),
                ann.describe(),
            ));
            continue;
        };
        if target.stripped && relocated.insert(image.id) {
            report.record_relocated(&image.file_name);
        }

        let bbox = ann
            .bbox
            .to_normalized(f64::from(image.width), f64::from(image.height));
        pending
            .entry(target.path)
            .or_default()
            .push(format_label_line(class_index, &bbox));
    }

    for (path, lines) in &pending {
        append_label_lines(path, lines)?;
        report.files_written += 1;
        report.lines_written += lines.len();
    }

    if report.skipped_count() > 0 {
        log::warn!(
            "skipped {} of {} annotation(s); see the report for details",
            report.skipped_count(),
            report.records_in
        );
    }
    Ok(report)
}

/// Rewrites every label file under `src_dir` into `dst_dir` through
/// `mapping`.
///
/// The directory layout below `src_dir` is mirrored. `dst_dir` may equal
/// `src_dir`; each file is read completely before it is replaced.
pub fn reindex_label_dir(
    src_dir: &Path,
    dst_dir: &Path,
    mapping: &IndexMapping,
    policy: UnmappedPolicy,
) -> Result<RewriteReport, TaxolabelError> {
    let files = collect_label_files(src_dir)?;
    log::info!(
        "re-indexing {} label file(s) from {}",
        files.len(),
        src_dir.display()
    );

    let mut report = RewriteReport::new(RewriteMode::Reindex);
    report.unmapped_policy = Some(policy);

    for src_path in files {
        let rel = rel_string(src_dir, &src_path);
        let content = fs::read_to_string(&src_path)?;
        let lines = reindex_label_str(&content, mapping, policy, &rel, &mut report);

        write_label_file(&dst_dir.join(&rel), &lines)?;
        report.files_written += 1;
        report.lines_written += lines.len();
    }

    if report.unmapped_lines() > 0 {
        log::warn!(
            "{} label line(s) carried a class with no counterpart in the new scheme",
            report.unmapped_lines()
        );
    }
    if report.skipped_count() > 0 {
        log::warn!("skipped {} malformed label line(s)", report.skipped_count());
    }
    Ok(report)
}

/// Re-indexes the lines of one label file.
///
/// `context` names the file in report entries. Blank lines vanish silently;
/// malformed ones are reported and left out.
pub fn reindex_label_str(
    content: &str,
    mapping: &IndexMapping,
    policy: UnmappedPolicy,
    context: &str,
    report: &mut RewriteReport,
) -> Vec<String> {
    let mut out = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let row = match parse_label_line(line) {
            Ok(Some(row)) => row,
            Ok(None) => continue,
            Err(reason) => {
                report.records_in += 1;
                report.add(RewriteIssue::new(
                    RewriteIssueCode::MalformedLabelLine,
                    reason.to_string(),
                    format!("{context}:{}", line_no + 1),
                ));
                continue;
            }
        };
        report.records_in += 1;

        match mapping.resolve(row.class_index, policy) {
            Resolution::Mapped(new_index) => out.push(row.render_with(new_index)),
            Resolution::KeptUnmapped(old_index) => {
                report.record_unmapped(old_index);
                out.push(row.render_with(old_index));
            }
            Resolution::Dropped => report.record_unmapped(row.class_index),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Annotation, BBoxXYWH, Category, ClassIndex};
    use crate::remap::{build_category_table, OrderPolicy};

    fn dataset() -> Dataset {
        Dataset {
            images: vec![
                Image::new(1u64, "a.jpg", 100, 100),
                Image::new(2u64, "sub/b.png", 200, 100),
                Image::new(3u64, "broken.jpg", 0, 50),
            ],
            categories: vec![Category::new(7u64, "car"), Category::new(3u64, "person")],
            annotations: vec![
                Annotation::new(1u64, 7u64, BBoxXYWH::new(10.0, 10.0, 20.0, 20.0)).with_id(1),
                Annotation::new(1u64, 3u64, BBoxXYWH::new(0.0, 0.0, 100.0, 100.0)).with_id(2),
                Annotation::new(2u64, 3u64, BBoxXYWH::new(50.0, 25.0, 100.0, 50.0)).with_id(3),
                Annotation::new(9u64, 3u64, BBoxXYWH::new(0.0, 0.0, 1.0, 1.0)).with_id(4),
                Annotation::new(1u64, 99u64, BBoxXYWH::new(0.0, 0.0, 1.0, 1.0)).with_id(5),
                Annotation::new(3u64, 7u64, BBoxXYWH::new(0.0, 0.0, 1.0, 1.0)).with_id(6),
            ],
        }
    }

    #[test]
    fn fresh_build_writes_normalized_lines() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        let data = dataset();
        let table = build_category_table(&data.categories, OrderPolicy::Declared);

        let report = write_fresh_labels(&data, &table, &labels).expect("fresh build");

        let a = fs::read_to_string(labels.join("a.txt")).expect("read a.txt");
        assert_eq!(
            a,
            "0 0.200000 0.200000 0.200000 0.200000\n1 0.500000 0.500000 1.000000 1.000000\n"
        );
        let b = fs::read_to_string(labels.join("sub/b.txt")).expect("read b.txt");
        assert_eq!(b, "1 0.500000 0.500000 0.500000 0.500000\n");
        assert!(!labels.join("broken.txt").exists());

        assert_eq!(report.records_in, 6);
        assert_eq!(report.lines_written, 3);
        assert_eq!(report.files_written, 2);
        assert_eq!(report.count_of(RewriteIssueCode::MissingImageRef), 1);
        assert_eq!(report.count_of(RewriteIssueCode::MissingCategoryRef), 1);
        assert_eq!(report.count_of(RewriteIssueCode::InvalidImageDimensions), 1);
    }

    #[test]
    fn fresh_build_uses_the_table_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let data = dataset();
        let table = build_category_table(&data.categories, OrderPolicy::SortedBySourceId);

        write_fresh_labels(&data, &table, temp.path()).expect("fresh build");
        let a = fs::read_to_string(temp.path().join("a.txt")).expect("read a.txt");
        let indices: Vec<&str> = a.lines().map(|l| &l[..1]).collect();
        assert_eq!(indices, vec!["1", "0"]);
    }

    #[test]
    fn fresh_build_appends_on_rerun() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let data = dataset();
        let table = build_category_table(&data.categories, OrderPolicy::Declared);

        write_fresh_labels(&data, &table, temp.path()).expect("first run");
        write_fresh_labels(&data, &table, temp.path()).expect("second run");
        let a = fs::read_to_string(temp.path().join("a.txt")).expect("read a.txt");
        assert_eq!(a.lines().count(), 4);
    }

    #[test]
    fn fresh_build_keeps_escaping_image_paths_inside_labels() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("out/labels");
        let elsewhere = temp.path().join("elsewhere/img.jpg");
        let data = Dataset {
            images: vec![
                Image::new(1u64, elsewhere.to_string_lossy(), 100, 100),
                Image::new(2u64, "../../escape.jpg", 100, 100),
                Image::new(3u64, "..", 100, 100),
            ],
            categories: vec![Category::new(7u64, "car")],
            annotations: vec![
                Annotation::new(1u64, 7u64, BBoxXYWH::new(0.0, 0.0, 10.0, 10.0)),
                Annotation::new(1u64, 7u64, BBoxXYWH::new(5.0, 5.0, 10.0, 10.0)),
                Annotation::new(2u64, 7u64, BBoxXYWH::new(0.0, 0.0, 10.0, 10.0)),
                Annotation::new(3u64, 7u64, BBoxXYWH::new(0.0, 0.0, 10.0, 10.0)),
            ],
        };
        let table = build_category_table(&data.categories, OrderPolicy::Declared);

        let report = write_fresh_labels(&data, &table, &labels).expect("fresh build");

        assert!(!temp.path().join("elsewhere/img.txt").exists());
        assert!(!temp.path().join("escape.txt").exists());
        let inside = labels.join(elsewhere.strip_prefix("/").expect("absolute temp path"));
        assert_eq!(
            fs::read_to_string(inside.with_extension("txt")).expect("read relocated").lines().count(),
            2
        );
        assert!(labels.join("escape.txt").is_file());

        assert_eq!(report.relocated.len(), 2);
        assert_eq!(report.relocated[1], "../../escape.jpg");
        assert_eq!(report.count_of(RewriteIssueCode::UnusableImagePath), 1);
        assert_eq!(report.lines_written, 3);
    }

    #[test]
    fn fresh_build_skips_non_finite_boxes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let data = Dataset {
            images: vec![Image::new(1u64, "a.jpg", 100, 100)],
            categories: vec![Category::new(7u64, "car")],
            annotations: vec![
                Annotation::new(1u64, 7u64, BBoxXYWH::new(f64::NAN, 0.0, 10.0, 10.0)),
                Annotation::new(1u64, 7u64, BBoxXYWH::new(0.0, 0.0, f64::INFINITY, 10.0)),
                Annotation::new(1u64, 7u64, BBoxXYWH::new(0.0, 0.0, 10.0, 10.0)),
            ],
        };
        let table = build_category_table(&data.categories, OrderPolicy::Declared);

        let report = write_fresh_labels(&data, &table, temp.path()).expect("fresh build");

        assert_eq!(report.count_of(RewriteIssueCode::NonFiniteBox), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("a.txt")).expect("read a.txt"),
            "0 0.050000 0.050000 0.100000 0.100000\n"
        );
    }

    #[test]
    fn reindex_str_maps_drops_and_reports() {
        let mapping = IndexMapping::from_pairs([(0, 1), (1, 2)]);
        let mut report = RewriteReport::new(RewriteMode::Reindex);
        let content = "0 0.5 0.5 0.1 0.1\n\n2 0.1 0.1 0.1 0.1\n1 0.3 bad 0.1 0.1\n1 0.25 0.25 0.5 0.5\n";

        let lines = reindex_label_str(content, &mapping, UnmappedPolicy::Drop, "x.txt", &mut report);

        assert_eq!(lines, vec!["1 0.5 0.5 0.1 0.1", "2 0.25 0.25 0.5 0.5"]);
        assert_eq!(report.records_in, 4);
        assert_eq!(report.unmapped.get(&ClassIndex(2)), Some(&1));
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].context, "x.txt:4");
    }

    #[test]
    fn reindex_str_keeps_unmapped_when_asked() {
        let mapping = IndexMapping::from_pairs([(0, 1)]);
        let mut report = RewriteReport::new(RewriteMode::Reindex);
        let lines = reindex_label_str(
            "5 0.1 0.2 0.3 0.4\n",
            &mapping,
            UnmappedPolicy::Keep,
            "y.txt",
            &mut report,
        );
        assert_eq!(lines, vec!["5 0.1 0.2 0.3 0.4"]);
        assert_eq!(report.unmapped_lines(), 1);
    }

    #[test]
    fn reindex_dir_mirrors_layout_and_is_idempotent() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("val")).expect("create src");
        fs::write(src.join("a.txt"), "0 0.5 0.5 0.2 0.2\n").expect("write a");
        fs::write(src.join("val/b.txt"), "1 0.1 0.1 0.1 0.1\n0 0.9 0.9 0.1 0.1\n")
            .expect("write b");

        let mapping = IndexMapping::from_pairs([(0, 3), (1, 4)]);
        for _ in 0..2 {
            let report = reindex_label_dir(&src, &dst, &mapping, UnmappedPolicy::Drop)
                .expect("reindex");
            assert_eq!(report.files_written, 2);
            assert_eq!(report.lines_written, 3);
            assert!(report.is_clean());
        }

        assert_eq!(
            fs::read_to_string(dst.join("val/b.txt")).expect("read b"),
            "4 0.1 0.1 0.1 0.1\n3 0.9 0.9 0.1 0.1\n"
        );
    }

    #[test]
    fn reindex_dir_requires_source() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = reindex_label_dir(
            &temp.path().join("missing"),
            temp.path(),
            &IndexMapping::default(),
            UnmappedPolicy::Drop,
        )
        .unwrap_err();
        assert!(matches!(err, TaxolabelError::LabelDirMissing { .. }));
    }
}
