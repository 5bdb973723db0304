use strum::{EnumCount, EnumIter};

/// A map lifecycle transition reported by the rendering engine, with its
/// event-specific payload.
///
/// Exactly one variant is dispatched per engine notification. The set is
/// closed: collaborators above this crate match on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// The displayed camera region is about to change.
    CameraWillChange { animated: bool },
    /// The camera region is changing right now.
    CameraIsChanging,
    /// The camera region finished changing.
    CameraDidChange { animated: bool },
    /// The map is about to start loading a new style.
    WillStartLoadingMap,
    /// The map finished loading its style and sources.
    DidFinishLoadingMap,
    /// The map failed to load. Reported as an ordinary event, not a fault;
    /// retries belong to the style-loading collaborator.
    DidFailLoadingMap { error: String },
    WillStartRenderingFrame,
    /// `partial` is true when the frame was presented before every tile in
    /// view finished loading.
    DidFinishRenderingFrame { partial: bool },
    WillStartRenderingMap,
    DidFinishRenderingMap { partial: bool },
    /// A style finished loading. The first one settles the ready queue.
    DidFinishLoadingStyle,
    /// A source was added, removed or had its data updated.
    SourceChanged { id: String },
}

/// Tag for one kind of [`MapEvent`], used to key single-slot listener
/// registration.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, EnumCount, EnumIter)]
pub enum MapEventKind {
    /// Receives [`MapEvent::CameraWillChange`]
    CameraWillChange,
    /// Receives [`MapEvent::CameraIsChanging`]
    CameraIsChanging,
    /// Receives [`MapEvent::CameraDidChange`]
    CameraDidChange,
    /// Receives [`MapEvent::WillStartLoadingMap`]
    WillStartLoadingMap,
    /// Receives [`MapEvent::DidFinishLoadingMap`]
    DidFinishLoadingMap,
    /// Receives [`MapEvent::DidFailLoadingMap`]
    DidFailLoadingMap,
    /// Receives [`MapEvent::WillStartRenderingFrame`]
    WillStartRenderingFrame,
    /// Receives [`MapEvent::DidFinishRenderingFrame`]
    DidFinishRenderingFrame,
    /// Receives [`MapEvent::WillStartRenderingMap`]
    WillStartRenderingMap,
    /// Receives [`MapEvent::DidFinishRenderingMap`]
    DidFinishRenderingMap,
    /// Receives [`MapEvent::DidFinishLoadingStyle`]
    DidFinishLoadingStyle,
    /// Receives [`MapEvent::SourceChanged`]
    SourceChanged,
}

/// Integer tag delivered to the deprecated multiplexed listener API.
pub type MapChange = i32;

/// Compatibility tags for [`crate::legacy::MapChangeListener`]. The values
/// are wire-stable; the animated/partial payload splits that the typed API
/// carries inline are encoded as separate tags here.
pub mod map_change {
    use super::MapChange;

    pub const REGION_WILL_CHANGE: MapChange = 0;
    pub const REGION_WILL_CHANGE_ANIMATED: MapChange = 1;
    pub const REGION_IS_CHANGING: MapChange = 2;
    pub const REGION_DID_CHANGE: MapChange = 3;
    pub const REGION_DID_CHANGE_ANIMATED: MapChange = 4;
    pub const WILL_START_LOADING_MAP: MapChange = 5;
    pub const DID_FINISH_LOADING_MAP: MapChange = 6;
    pub const DID_FAIL_LOADING_MAP: MapChange = 7;
    pub const WILL_START_RENDERING_FRAME: MapChange = 8;
    pub const DID_FINISH_RENDERING_FRAME: MapChange = 9;
    pub const DID_FINISH_RENDERING_FRAME_FULLY_RENDERED: MapChange = 10;
    pub const WILL_START_RENDERING_MAP: MapChange = 11;
    pub const DID_FINISH_RENDERING_MAP: MapChange = 12;
    pub const DID_FINISH_RENDERING_MAP_FULLY_RENDERED: MapChange = 13;
    pub const DID_FINISH_LOADING_STYLE: MapChange = 14;
    pub const SOURCE_DID_CHANGE: MapChange = 15;
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::CameraWillChange { .. } => MapEventKind::CameraWillChange,
            MapEvent::CameraIsChanging => MapEventKind::CameraIsChanging,
            MapEvent::CameraDidChange { .. } => MapEventKind::CameraDidChange,
            MapEvent::WillStartLoadingMap => MapEventKind::WillStartLoadingMap,
            MapEvent::DidFinishLoadingMap => MapEventKind::DidFinishLoadingMap,
            MapEvent::DidFailLoadingMap { .. } => MapEventKind::DidFailLoadingMap,
            MapEvent::WillStartRenderingFrame => MapEventKind::WillStartRenderingFrame,
            MapEvent::DidFinishRenderingFrame { .. } => MapEventKind::DidFinishRenderingFrame,
            MapEvent::WillStartRenderingMap => MapEventKind::WillStartRenderingMap,
            MapEvent::DidFinishRenderingMap { .. } => MapEventKind::DidFinishRenderingMap,
            MapEvent::DidFinishLoadingStyle => MapEventKind::DidFinishLoadingStyle,
            MapEvent::SourceChanged { .. } => MapEventKind::SourceChanged,
        }
    }

    /// The compatibility tag broadcast to legacy listeners for this event.
    pub fn legacy_change(&self) -> MapChange {
        use map_change::*;
        match self {
            MapEvent::CameraWillChange { animated: false } => REGION_WILL_CHANGE,
            MapEvent::CameraWillChange { animated: true } => REGION_WILL_CHANGE_ANIMATED,
            MapEvent::CameraIsChanging => REGION_IS_CHANGING,
            MapEvent::CameraDidChange { animated: false } => REGION_DID_CHANGE,
            MapEvent::CameraDidChange { animated: true } => REGION_DID_CHANGE_ANIMATED,
            MapEvent::WillStartLoadingMap => WILL_START_LOADING_MAP,
            MapEvent::DidFinishLoadingMap => DID_FINISH_LOADING_MAP,
            MapEvent::DidFailLoadingMap { .. } => DID_FAIL_LOADING_MAP,
            MapEvent::WillStartRenderingFrame => WILL_START_RENDERING_FRAME,
            MapEvent::DidFinishRenderingFrame { partial: true } => DID_FINISH_RENDERING_FRAME,
            MapEvent::DidFinishRenderingFrame { partial: false } => {
                DID_FINISH_RENDERING_FRAME_FULLY_RENDERED
            }
            MapEvent::WillStartRenderingMap => WILL_START_RENDERING_MAP,
            MapEvent::DidFinishRenderingMap { partial: true } => DID_FINISH_RENDERING_MAP,
            MapEvent::DidFinishRenderingMap { partial: false } => {
                DID_FINISH_RENDERING_MAP_FULLY_RENDERED
            }
            MapEvent::DidFinishLoadingStyle => DID_FINISH_LOADING_STYLE,
            MapEvent::SourceChanged { .. } => SOURCE_DID_CHANGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn sample(kind: MapEventKind) -> MapEvent {
        match kind {
            MapEventKind::CameraWillChange => MapEvent::CameraWillChange { animated: false },
            MapEventKind::CameraIsChanging => MapEvent::CameraIsChanging,
            MapEventKind::CameraDidChange => MapEvent::CameraDidChange { animated: false },
            MapEventKind::WillStartLoadingMap => MapEvent::WillStartLoadingMap,
            MapEventKind::DidFinishLoadingMap => MapEvent::DidFinishLoadingMap,
            MapEventKind::DidFailLoadingMap => MapEvent::DidFailLoadingMap {
                error: "style 404".into(),
            },
            MapEventKind::WillStartRenderingFrame => MapEvent::WillStartRenderingFrame,
            MapEventKind::DidFinishRenderingFrame => {
                MapEvent::DidFinishRenderingFrame { partial: false }
            }
            MapEventKind::WillStartRenderingMap => MapEvent::WillStartRenderingMap,
            MapEventKind::DidFinishRenderingMap => {
                MapEvent::DidFinishRenderingMap { partial: false }
            }
            MapEventKind::DidFinishLoadingStyle => MapEvent::DidFinishLoadingStyle,
            MapEventKind::SourceChanged => MapEvent::SourceChanged { id: "water".into() },
        }
    }

    #[test]
    fn every_kind_round_trips_through_its_event() {
        for kind in MapEventKind::iter() {
            assert_eq!(sample(kind).kind(), kind);
        }
    }

    #[test]
    fn legacy_tags_cover_the_full_compatibility_range() {
        let mut tags: Vec<MapChange> = vec![
            MapEvent::CameraWillChange { animated: true }.legacy_change(),
            MapEvent::CameraDidChange { animated: true }.legacy_change(),
            MapEvent::DidFinishRenderingFrame { partial: true }.legacy_change(),
            MapEvent::DidFinishRenderingMap { partial: true }.legacy_change(),
        ];
        for kind in MapEventKind::iter() {
            tags.push(sample(kind).legacy_change());
        }
        tags.sort_unstable();
        tags.dedup();
        // Every kind gets a tag, plus one extra per animated/partial split.
        let expected = MapEventKind::COUNT as MapChange + 4;
        assert_eq!(tags, (0..expected).collect::<Vec<_>>());
    }

    #[test]
    fn animated_and_partial_payloads_split_into_distinct_tags() {
        assert_eq!(
            MapEvent::CameraWillChange { animated: false }.legacy_change(),
            map_change::REGION_WILL_CHANGE
        );
        assert_eq!(
            MapEvent::CameraWillChange { animated: true }.legacy_change(),
            map_change::REGION_WILL_CHANGE_ANIMATED
        );
        assert_eq!(
            MapEvent::DidFinishRenderingFrame { partial: false }.legacy_change(),
            map_change::DID_FINISH_RENDERING_FRAME_FULLY_RENDERED
        );
    }
}
