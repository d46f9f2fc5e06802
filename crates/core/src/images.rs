//! Image comparison
//!
//! Images carry no comparable text, so matching is by content hash:
//! identical pairs first, then a same-slot heuristic that pairs two
//! unmatched images occupying the same ordinal position as `modified`, and
//! finally the added/deleted leftovers. Each image lands in exactly one
//! record.

use std::collections::BTreeSet;

use tracing::debug;

use crate::change::{ChangeStatus, ImageChangeRecord};
use crate::document::ImageRecord;

/// Compares the image lists of two documents.
#[derive(Debug, Default)]
pub struct ImageDiffer;

impl ImageDiffer {
    pub fn new() -> Self {
        Self
    }

    pub fn diff(&self, images_1: &[ImageRecord], images_2: &[ImageRecord]) -> Vec<ImageChangeRecord> {
        let mut records = Vec::new();
        let mut matched_1: BTreeSet<usize> = BTreeSet::new();
        let mut matched_2: BTreeSet<usize> = BTreeSet::new();

        // Identical content, wherever it sits.
        for (pos_1, image_1) in images_1.iter().enumerate() {
            let candidate = images_2.iter().enumerate().find(|(pos_2, image_2)| {
                !matched_2.contains(pos_2) && image_2.content_hash == image_1.content_hash
            });
            if let Some((pos_2, image_2)) = candidate {
                matched_1.insert(pos_1);
                matched_2.insert(pos_2);
                records.push(ImageChangeRecord {
                    status: ChangeStatus::Identical,
                    image_1_index: Some(image_1.ordinal_index),
                    image_2_index: Some(image_2.ordinal_index),
                    change_description: "no changes".to_string(),
                });
            }
        }

        // Same structural slot, different content.
        for (pos_1, image_1) in images_1.iter().enumerate() {
            if matched_1.contains(&pos_1) {
                continue;
            }
            let candidate = images_2.iter().enumerate().find(|(pos_2, image_2)| {
                !matched_2.contains(pos_2) && image_2.ordinal_index == image_1.ordinal_index
            });
            if let Some((pos_2, image_2)) = candidate {
                matched_1.insert(pos_1);
                matched_2.insert(pos_2);
                debug!(slot = image_1.ordinal_index, "image replaced in place");
                records.push(ImageChangeRecord {
                    status: ChangeStatus::Modified,
                    image_1_index: Some(image_1.ordinal_index),
                    image_2_index: Some(image_2.ordinal_index),
                    change_description: format!("image {} replaced", image_1.ordinal_index),
                });
            }
        }

        for (pos_1, image_1) in images_1.iter().enumerate() {
            if !matched_1.contains(&pos_1) {
                records.push(ImageChangeRecord {
                    status: ChangeStatus::Deleted,
                    image_1_index: Some(image_1.ordinal_index),
                    image_2_index: None,
                    change_description: format!("image {} deleted", image_1.ordinal_index),
                });
            }
        }
        for (pos_2, image_2) in images_2.iter().enumerate() {
            if !matched_2.contains(&pos_2) {
                records.push(ImageChangeRecord {
                    status: ChangeStatus::Added,
                    image_1_index: None,
                    image_2_index: Some(image_2.ordinal_index),
                    change_description: format!("image {} added", image_2.ordinal_index),
                });
            }
        }

        records
    }
}
