/// Storm analysis for the threat service.
///
/// Submodules:
/// - `merge`     - combines the four storm feeds into one de-duplicated list.
/// - `relevance` - drops storms too far from the target to matter.
/// - `threat`    - scores a single storm against the target.

pub mod merge;
pub mod relevance;
pub mod threat;
