// ── Entity normalization ──
//
// Maps raw wire entities into typed domain records. The registry binds
// each list kind to its normalizer once at construction -- adding a new
// kind means registering a function, not extending a conditional.

use std::collections::HashMap;
use std::sync::Arc;

use driftline_api::RawEntity;
use tracing::debug;

use crate::list::ListKind;
use crate::model::{Activity, Blog, FeedEntity, Group, User};

/// Normalizer for one list kind. `None` drops the entity (missing guid,
/// shape the kind doesn't recognize).
pub type NormalizeFn = fn(&RawEntity) -> Option<FeedEntity>;

/// Fire-and-forget media preload hook, invoked per normalized entity
/// when a load requests preloading. The SDK never awaits it.
pub type PreloadFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Registry of per-kind normalizers plus the optional preload hook.
#[derive(Default)]
pub struct NormalizerRegistry {
    normalizers: HashMap<ListKind, NormalizeFn>,
    preloader: Option<PreloadFn>,
}

impl NormalizerRegistry {
    /// Registry with the standard kind bindings: image/video/activity
    /// rows normalize as activities, the rest by their own shape.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(ListKind::Image, normalize_activity);
        registry.register(ListKind::Video, normalize_activity);
        registry.register(ListKind::Activity, normalize_activity);
        registry.register(ListKind::Blog, normalize_blog);
        registry.register(ListKind::User, normalize_user);
        registry.register(ListKind::Group, normalize_group);
        registry
    }

    /// Bind (or rebind) the normalizer for a kind.
    pub fn register(&mut self, kind: ListKind, normalize: NormalizeFn) {
        self.normalizers.insert(kind, normalize);
    }

    /// Install the media preload hook.
    pub fn set_preloader(&mut self, preloader: PreloadFn) {
        self.preloader = Some(preloader);
    }

    /// Normalize a batch for one kind, optionally firing the preload
    /// hook for each entity that carries a thumbnail.
    pub fn create_many(
        &self,
        kind: ListKind,
        raw: &[RawEntity],
        preload: bool,
    ) -> Vec<FeedEntity> {
        let Some(normalize) = self.normalizers.get(&kind) else {
            debug!(%kind, "no normalizer registered; dropping batch");
            return Vec::new();
        };

        let entities: Vec<FeedEntity> = raw.iter().filter_map(normalize).collect();

        if preload {
            if let Some(preloader) = &self.preloader {
                for entity in &entities {
                    if let Some(url) = entity.thumbnail() {
                        preloader(url);
                    }
                }
            }
        }

        entities
    }
}

fn normalize_activity(raw: &RawEntity) -> Option<FeedEntity> {
    Activity::from_raw(raw).map(FeedEntity::Activity)
}

fn normalize_blog(raw: &RawEntity) -> Option<FeedEntity> {
    Blog::from_raw(raw).map(FeedEntity::Blog)
}

fn normalize_user(raw: &RawEntity) -> Option<FeedEntity> {
    User::from_raw(raw).map(FeedEntity::User)
}

fn normalize_group(raw: &RawEntity) -> Option<FeedEntity> {
    Group::from_raw(raw).map(FeedEntity::Group)
}
