//! Ошибки игрового цикла
//!
//! Все варианты не фатальны: системы ловят их на границе, логируют
//! и продолжают кадр. Наружу из ECS ничего не пробрасывается.

use thiserror::Error;

use crate::session::{AnchorHandle, NodeId};

#[derive(Debug, Error)]
pub enum GalleryError {
    /// AR session не готова (view не показан / session на паузе)
    #[error("rendering session is not ready")]
    RenderingUnavailable,

    /// Tap попал в пустоту, в HUD/декорацию или в уже мёртвую мишень
    #[error("tap did not resolve to a live target")]
    NoHitTarget,

    /// Tap или tick пришёл после GameOver
    #[error("event arrived after game over")]
    SpuriousLateEvent,

    #[error("session has no anchor {0:?}")]
    UnknownAnchor(AnchorHandle),

    #[error("session has no node {0:?}")]
    UnknownNode(NodeId),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML разобран, но значение вне допустимого диапазона
    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl GalleryError {
    /// Ожидаемые в нормальной игре no-op'ы (не стоит warning'а в логе)
    pub fn is_benign(&self) -> bool {
        matches!(self, GalleryError::NoHitTarget | GalleryError::SpuriousLateEvent)
    }
}
