//! Keyword-based classification of image files by name.

use std::path::PathBuf;

use defect_core::KeywordMap;
use tracing::warn;

use crate::loader::file_name_of;

/// Maximum number of unclassified file names listed in the warning
pub const UNCLASSIFIED_PREVIEW: usize = 5;

/// Images assigned to a single class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassImages {
    pub name: String,
    pub paths: Vec<PathBuf>,
}

/// Result of classifying a set of images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Every class of the keyword map, in map order
    pub classes: Vec<ClassImages>,
    /// Images that matched no class
    pub unclassified: Vec<PathBuf>,
}

impl Classification {
    /// Class names in map order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|class| class.name.as_str())
    }

    /// Images of a class, if the class exists
    pub fn get(&self, class_name: &str) -> Option<&[PathBuf]> {
        self.classes
            .iter()
            .find(|class| class.name == class_name)
            .map(|class| class.paths.as_slice())
    }

    /// (class, count) pairs in map order
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.classes
            .iter()
            .map(|class| (class.name.clone(), class.paths.len()))
            .collect()
    }

    /// Number of images assigned to some class
    pub fn classified_len(&self) -> usize {
        self.classes.iter().map(|class| class.paths.len()).sum()
    }
}

/// Assigns each path to the first class whose keywords occur in its file name
pub fn classify_paths(paths: &[PathBuf], keywords: &KeywordMap) -> Classification {
    let mut classes: Vec<ClassImages> = keywords
        .class_names()
        .map(|name| ClassImages {
            name: name.to_string(),
            paths: Vec::new(),
        })
        .collect();
    let mut unclassified = Vec::new();

    for path in paths {
        match keywords.match_index(&file_name_of(path)) {
            Some(idx) => classes[idx].paths.push(path.clone()),
            None => unclassified.push(path.clone()),
        }
    }

    Classification {
        classes,
        unclassified,
    }
}

/// Lines of the unclassified-images warning: a header, up to five file names
/// and a trailer counting the rest
pub fn unclassified_report(unclassified: &[PathBuf]) -> Vec<String> {
    if unclassified.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(UNCLASSIFIED_PREVIEW + 2);
    lines.push(format!(
        "WARNING: {} unclassified images:",
        unclassified.len()
    ));

    for path in unclassified.iter().take(UNCLASSIFIED_PREVIEW) {
        lines.push(format!("  - {}", file_name_of(path)));
    }

    if unclassified.len() > UNCLASSIFIED_PREVIEW {
        lines.push(format!(
            "  ... and {} more images",
            unclassified.len() - UNCLASSIFIED_PREVIEW
        ));
    }

    lines
}

pub(crate) fn log_unclassified(unclassified: &[PathBuf]) {
    for line in unclassified_report(unclassified) {
        warn!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defect_core::ClassKeywords;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/data").join(n)).collect()
    }

    #[test]
    fn test_classify_scenario() {
        let images = paths(&["car_ok.jpg", "car_scratch.jpg", "random.bmp"]);
        let result = classify_paths(&images, &KeywordMap::default());

        assert_eq!(result.get("defeito").unwrap(), &paths(&["car_scratch.jpg"])[..]);
        assert_eq!(result.get("ok").unwrap(), &paths(&["car_ok.jpg"])[..]);
        assert_eq!(result.unclassified, paths(&["random.bmp"]));
        assert_eq!(result.classified_len(), 2);
    }

    #[test]
    fn test_extension_does_not_match_keywords() {
        // "bm" is an ok keyword and would otherwise match every .bmp file
        let images = paths(&["random.bmp", "bm_front.bmp"]);
        let result = classify_paths(&images, &KeywordMap::default());
        assert_eq!(result.unclassified, paths(&["random.bmp"]));
        assert_eq!(result.get("ok").unwrap(), &paths(&["bm_front.bmp"])[..]);
    }

    #[test]
    fn test_classes_present_even_when_empty() {
        let result = classify_paths(&[], &KeywordMap::default());
        assert_eq!(
            result.counts(),
            vec![("defeito".to_string(), 0), ("ok".to_string(), 0)]
        );
        assert!(result.unclassified.is_empty());
    }

    #[test]
    fn test_matches_file_name_not_directory() {
        let images = vec![PathBuf::from("/scratch/photo.jpg")];
        let result = classify_paths(&images, &KeywordMap::default());
        assert_eq!(result.unclassified.len(), 1);
        assert_eq!(result.classified_len(), 0);
    }

    #[test]
    fn test_first_class_wins_on_overlap() {
        let keywords = KeywordMap::new(vec![
            ClassKeywords::new("first", ["door"]),
            ClassKeywords::new("second", ["dent"]),
        ])
        .unwrap();

        let images = paths(&["door_dent.png", "dent_only.png"]);
        let result = classify_paths(&images, &keywords);
        assert_eq!(result.get("first").unwrap(), &paths(&["door_dent.png"])[..]);
        assert_eq!(result.get("second").unwrap(), &paths(&["dent_only.png"])[..]);
    }

    #[test]
    fn test_keeps_input_order_within_class() {
        let images = paths(&["b_dent.jpg", "a_dent.jpg"]);
        let result = classify_paths(&images, &KeywordMap::default());
        assert_eq!(result.get("defeito").unwrap(), &images[..]);
    }

    #[test]
    fn test_unclassified_report_caps_at_five() {
        let images: Vec<PathBuf> = (0..8)
            .map(|i| PathBuf::from(format!("/data/img_{i}.png")))
            .collect();
        let lines = unclassified_report(&images);

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "WARNING: 8 unclassified images:");
        assert_eq!(lines[1], "  - img_0.png");
        assert_eq!(lines[5], "  - img_4.png");
        assert_eq!(lines[6], "  ... and 3 more images");
    }

    #[test]
    fn test_unclassified_report_exactly_five() {
        let images: Vec<PathBuf> = (0..5)
            .map(|i| PathBuf::from(format!("img_{i}.png")))
            .collect();
        let lines = unclassified_report(&images);
        assert_eq!(lines.len(), 6);
        assert!(!lines.iter().any(|l| l.contains("more images")));
    }

    #[test]
    fn test_unclassified_report_empty() {
        assert!(unclassified_report(&[]).is_empty());
    }

    #[test]
    fn test_agrees_with_keyword_map() {
        let keywords = KeywordMap::default();
        let images = paths(&[
            "car_scratch.jpg",
            "car_ok.jpg",
            "random.bmp",
            "BMW_side.png",
            "plain.tif",
        ]);
        let result = classify_paths(&images, &keywords);

        for path in &images {
            let name = file_name_of(path);
            match keywords.match_class(&name) {
                Some(class) => assert!(result.get(class).unwrap().contains(path), "{name}"),
                None => assert!(result.unclassified.contains(path), "{name}"),
            }
        }
        assert_eq!(result.unclassified, paths(&["random.bmp", "plain.tif"]));
    }
}
