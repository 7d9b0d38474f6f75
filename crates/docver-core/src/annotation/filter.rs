//! Removal of generated "View" hyperlinks before replay.
//!
//! Document viewers attach a `View` hyperlink to every page they render and
//! store them in a group named [`VIEW_LINKS_GROUP`]. Replaying those onto a
//! new version duplicates the links, so the snapshot step can strip them.

use super::{AnnotationBuffer, AnnotationGroup, BufferSection};
use regex::Regex;
use std::sync::LazyLock;

/// Group created by the viewer to hold generated links.
pub const VIEW_LINKS_GROUP: &str = "ViewLinks";

const VIEW_HYPERLINK_MARKER: &str = "HyperlinkName=View";

/// `Hyperlink1`, `DefaultHyperlink12` ... : a name ending in `Hyperlink<digits>`.
static HYPERLINK_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*Hyperlink\d+$").expect("valid hyperlink section pattern"));

/// Returns the group without its View hyperlinks, or `None` when nothing
/// would be left to replay.
pub fn strip_view_hyperlinks(mut group: AnnotationGroup) -> Option<AnnotationGroup> {
    if group.name == VIEW_LINKS_GROUP {
        tracing::info!("[AnnotationFilter] Dropping generated group {}", group.name);
        return None;
    }

    if !group.buffer.contains(VIEW_HYPERLINK_MARKER) {
        return Some(group);
    }

    let mut buffer = AnnotationBuffer::parse(&group.buffer);
    let removed: Vec<String> = buffer
        .sections()
        .iter()
        .filter(|section| is_view_hyperlink(section))
        .map(|section| section.name.clone())
        .collect();

    buffer.retain_sections(|section| {
        !removed.iter().any(|name| {
            section.name == *name || section.name == format!("{}AnnotationHeader", name)
        })
    });

    if buffer.record_count() == 0 {
        tracing::info!(
            "[AnnotationFilter] Dropping group {} - all annotations were View hyperlinks",
            group.name
        );
        return None;
    }

    let remaining_links = buffer
        .sections()
        .iter()
        .filter(|section| is_hyperlink_section(section))
        .count();
    if let Some(total) = buffer.total_annotations() {
        let total = total.saturating_sub(removed.len() as u32);
        buffer.set_header_value("TotalAnnotations", total.to_string());
    }
    buffer.set_header_value("NoOfHyperlinks", remaining_links.to_string());

    tracing::info!(
        "[AnnotationFilter] Removed {} View hyperlink(s) from group {}",
        removed.len(),
        group.name
    );
    group.buffer = buffer.render();
    Some(group)
}

fn is_hyperlink_section(section: &BufferSection) -> bool {
    HYPERLINK_SECTION_RE.is_match(&section.name)
}

fn is_view_hyperlink(section: &BufferSection) -> bool {
    is_hyperlink_section(section) && section.get("HyperlinkName") == Some("View")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_links_group_is_dropped() {
        let group = AnnotationGroup::new(VIEW_LINKS_GROUP, "TotalAnnotations=0");
        assert!(strip_view_hyperlinks(group).is_none());
    }

    #[test]
    fn test_group_without_view_links_is_untouched() {
        let raw = "TotalAnnotations=1\n[Annotation 0]\nType=Note";
        let group = AnnotationGroup::new("notes", raw).with_type("N");
        let kept = strip_view_hyperlinks(group.clone()).unwrap();
        assert_eq!(kept, group);
    }

    #[test]
    fn test_only_view_links_drops_group() {
        let raw = "TotalAnnotations=2\nNoOfHyperlinks=2\n[Hyperlink1]\nHyperlinkName=View\n[Hyperlink2]\nHyperlinkName=View";
        assert!(strip_view_hyperlinks(AnnotationGroup::new("links", raw)).is_none());
    }

    #[test]
    fn test_mixed_group_keeps_other_links_and_fixes_counts() {
        let raw = "TotalAnnotations=3\nNoOfHyperlinks=2\n\
                   [Hyperlink1AnnotationHeader]\nRights=VM\n\
                   [Hyperlink1]\nHyperlinkName=View\n\
                   [Hyperlink2]\nHyperlinkName=Edit\n\
                   [Annotation 0]\nType=Note";
        let group = strip_view_hyperlinks(AnnotationGroup::new("mixed", raw)).unwrap();
        let buffer = AnnotationBuffer::parse(&group.buffer);

        assert_eq!(buffer.total_annotations(), Some(2));
        assert_eq!(buffer.header_value("NoOfHyperlinks"), Some("1"));
        let names: Vec<&str> = buffer.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Hyperlink2", "Annotation 0"]);
    }

    #[test]
    fn test_note_sharing_a_group_with_view_links_survives() {
        let raw = "TotalAnnotations=2\nNoOfHyperlinks=1\n\
                   [Hyperlink1AnnotationHeader]\nRights=VM\n\
                   [Hyperlink1]\nHyperlinkName=View\n\
                   [Annotation 0]\nType=Note";
        let group = strip_view_hyperlinks(AnnotationGroup::new("notes", raw)).unwrap();
        let buffer = AnnotationBuffer::parse(&group.buffer);

        assert_eq!(buffer.total_annotations(), Some(1));
        assert_eq!(buffer.header_value("NoOfHyperlinks"), Some("0"));
        assert_eq!(buffer.record_count(), 1);
        assert_eq!(buffer.sections()[0].get("Type"), Some("Note"));
    }

    #[test]
    fn test_hyperlink_section_detection() {
        let section = |name: &str| BufferSection {
            name: name.to_string(),
            entries: Vec::new(),
        };
        assert!(is_hyperlink_section(&section("Hyperlink1")));
        assert!(is_hyperlink_section(&section("DefaultHyperlink12")));
        assert!(!is_hyperlink_section(&section("Hyperlink")));
        assert!(!is_hyperlink_section(&section("Hyperlink1AnnotationHeader")));
        assert!(!is_hyperlink_section(&section("Annotation 0")));
    }
}
