/// Smallest accepted bounding box extent, in percent of the image dimension.
///
/// Boxes narrower or shorter than this are treated as invalid and are grown
/// to this size on repair, as long as the image has room for it.
pub const MIN_BOX_SIZE: f64 = 0.5;

/// Largest accepted bounding box extent, in percent of the image dimension.
///
/// Percentage space runs from 0 to this value on both axes.
pub const MAX_BOX_SIZE: f64 = 100.0;

/// Slack applied to the right/bottom edge checks.
///
/// `x + (100 - x)` is not always exactly `100.0` in binary floating point, so
/// a box repaired flush against an edge would otherwise fail validation.
pub const EDGE_EPSILON: f64 = 1e-9;

/// IoU threshold for duplicate removal.
///
/// When two detections overlap with an Intersection over Union strictly
/// greater than this value, the lower-confidence detection is dropped.
/// Higher than the usual NMS threshold because the vision model is asked
/// to emit one box per physical object and genuinely adjacent objects
/// (chairs around a table) overlap a fair amount.
pub const IOU_DEDUPE_THRESHOLD: f64 = 0.7;

/// Defaults used when a raw detection omits a field.
pub const DEFAULT_LABEL: &str = "Unknown";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_BOX_POSITION: f64 = 0.0;
pub const DEFAULT_BOX_EXTENT: f64 = 10.0;

/// Sentinel for "not applicable" record fields.
pub const PLACEHOLDER: &str = "—";
pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_SCENE_TYPE: &str = "unknown";

pub const GENERAL_CATEGORY: &str = "General";

pub const EMPTY_RECONCILE_OBJECT: &str = "Scene Contents";
pub const EMPTY_RECONCILE_DETAILS: &str = "No specific items detected — manual entry required";

pub const EMPTY_FILTER_OBJECT: &str = "Scene Analysis";
pub const EMPTY_FILTER_DETAILS: &str =
    "No valid objects detected — scene may be minimal or validation too strict";

/// Observations reported when the model gave none we could read.
pub const DEFAULT_OBSERVATIONS: [&str; 3] = [
    "Comprehensive analysis completed",
    "Manual review recommended for detailed insights",
    "Standard safety and maintenance protocols apply",
];

/// Scene tags the classifier uses for interiors.
pub const INDOOR_SCENES: &[&str] = &[
    "indoor_office",
    "indoor_residential",
    "indoor_commercial",
    "indoor_industrial",
];

/// Categories that cannot plausibly appear in an indoor scene.
pub const OUTDOOR_ONLY_CATEGORIES: &[&str] = &[
    "Power Infrastructure",
    "Water Bodies",
    "Agricultural",
    "Land Features",
];

/// Phrases that mark an object or description as outdoor.
pub const OUTDOOR_KEYWORDS: &[&str] = &[
    "power line",
    "substation",
    "road",
    "asphalt",
    "tree",
    "vegetation",
    "pylon",
];

/// Words in a legacy `details` field that already express a quantity.
pub const QUANTITY_WORDS: &[&str] = &["multiple", "several", "various", "many"];

/// Only this many significant words of an object name are looked up in the
/// source description.
pub const GROUNDING_WORD_LIMIT: usize = 2;

/// Words up to this length are too generic to ground an object.
pub const SIGNIFICANT_WORD_MIN_LEN: usize = 3;

/// Maximum number of images analysed at the same time.
pub const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Per-image timeout for the vision call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token prices in USD per 1K tokens.
pub const INPUT_TOKEN_COST: f64 = 0.0025;
pub const OUTPUT_TOKEN_COST: f64 = 0.01;

/// Environment variable pointing to a JSON pipeline config file.
pub const CONFIG_PATH_ENV_NAME: &str = "SCENELENS_CONFIG";

/// Thickness in pixels of the outline drawn by the overlay renderer.
pub const OVERLAY_LINE_THICKNESS: i32 = 3;

/// Caption text height in pixels.
pub const CAPTION_FONT_SIZE: f32 = 16.0;

/// Space above and below the caption text inside its background band.
pub const CAPTION_PADDING: i32 = 5;
