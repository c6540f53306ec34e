use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Record;

/// Every admin resource carrying a `visible` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    BlogPost,
    Category,
    Formation,
    Partner,
    QuizQuestion,
    Value,
}

/// Static facts about a kind: where it is routed, whether it keeps a
/// first-publish timestamp, and which rendered pages show it.
#[derive(Debug)]
pub struct KindDescriptor {
    pub kind: EntityKind,
    pub route_segment: &'static str,
    pub label: &'static str,
    pub tracks_published_at: bool,
    pub admin_path: &'static str,
    pub public_paths: &'static [&'static str],
    // Prefix of the per-record page, joined with the slug
    pub detail_prefix: Option<&'static str>,
}

static DESCRIPTORS: [KindDescriptor; 6] = [
    KindDescriptor {
        kind: EntityKind::BlogPost,
        route_segment: "blog",
        label: "Blog post",
        tracks_published_at: true,
        admin_path: "/admin/blog",
        public_paths: &["/blog"],
        detail_prefix: Some("/blog"),
    },
    KindDescriptor {
        kind: EntityKind::Category,
        route_segment: "categories",
        label: "Category",
        tracks_published_at: false,
        admin_path: "/admin/categories",
        public_paths: &["/blog", "/formations"],
        detail_prefix: None,
    },
    KindDescriptor {
        kind: EntityKind::Formation,
        route_segment: "formations",
        label: "Formation",
        tracks_published_at: false,
        admin_path: "/admin/formations",
        public_paths: &["/formations"],
        detail_prefix: Some("/formations"),
    },
    KindDescriptor {
        kind: EntityKind::Partner,
        route_segment: "partners",
        label: "Partner",
        tracks_published_at: false,
        admin_path: "/admin/partners",
        public_paths: &["/"],
        detail_prefix: None,
    },
    KindDescriptor {
        kind: EntityKind::QuizQuestion,
        route_segment: "quiz/questions",
        label: "Quiz question",
        tracks_published_at: false,
        admin_path: "/admin/quiz/questions",
        public_paths: &["/quiz"],
        detail_prefix: None,
    },
    KindDescriptor {
        kind: EntityKind::Value,
        route_segment: "values",
        label: "Value",
        tracks_published_at: false,
        admin_path: "/admin/values",
        public_paths: &["/"],
        detail_prefix: None,
    },
];

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::BlogPost,
        EntityKind::Category,
        EntityKind::Formation,
        EntityKind::Partner,
        EntityKind::QuizQuestion,
        EntityKind::Value,
    ];

    pub fn descriptor(self) -> &'static KindDescriptor {
        let idx = match self {
            EntityKind::BlogPost => 0,
            EntityKind::Category => 1,
            EntityKind::Formation => 2,
            EntityKind::Partner => 3,
            EntityKind::QuizQuestion => 4,
            EntityKind::Value => 5,
        };
        &DESCRIPTORS[idx]
    }

    pub fn tracks_published_at(self) -> bool {
        self.descriptor().tracks_published_at
    }

    pub fn route_segment(self) -> &'static str {
        self.descriptor().route_segment
    }

    /// Pages to revalidate after `record` changed: admin list, public
    /// lists, then the detail page when the record has a slug.
    pub fn cache_paths_for(self, record: &Record) -> Vec<String> {
        let desc = self.descriptor();
        let mut paths = Vec::with_capacity(desc.public_paths.len() + 2);
        paths.push(desc.admin_path.to_string());
        paths.extend(desc.public_paths.iter().map(|p| p.to_string()));

        if let (Some(prefix), Some(slug)) = (desc.detail_prefix, record.slug.as_deref()) {
            let slug = slug.trim_matches('/');
            if !slug.is_empty() {
                paths.push(format!("{}/{}", prefix, slug));
            }
        }
        paths
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_table_lines_up_with_kinds() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.descriptor().kind, kind);
        }
    }

    #[test]
    fn only_blog_posts_track_publication() {
        let tracking: Vec<_> = EntityKind::ALL
            .into_iter()
            .filter(|k| k.tracks_published_at())
            .collect();
        assert_eq!(tracking, vec![EntityKind::BlogPost]);
    }

    #[test]
    fn route_segments_are_unique() {
        let mut segments: Vec<_> = EntityKind::ALL.iter().map(|k| k.route_segment()).collect();
        segments.sort();
        segments.dedup();
        assert_eq!(segments.len(), EntityKind::ALL.len());
    }

    #[test]
    fn blog_paths_include_detail_page() {
        let post = Record::new("p1", EntityKind::BlogPost).with_slug("hello-world");
        assert_eq!(
            EntityKind::BlogPost.cache_paths_for(&post),
            vec!["/admin/blog", "/blog", "/blog/hello-world"]
        );
    }

    #[test]
    fn missing_or_blank_slug_skips_detail_page() {
        let post = Record::new("p1", EntityKind::Formation);
        assert_eq!(
            EntityKind::Formation.cache_paths_for(&post),
            vec!["/admin/formations", "/formations"]
        );

        let blank = Record::new("p2", EntityKind::Formation).with_slug("/");
        assert_eq!(EntityKind::Formation.cache_paths_for(&blank).len(), 2);
    }

    #[test]
    fn kinds_without_detail_pages_ignore_slug() {
        let partner = Record::new("x", EntityKind::Partner).with_slug("acme");
        assert_eq!(
            EntityKind::Partner.cache_paths_for(&partner),
            vec!["/admin/partners", "/"]
        );
    }
}
