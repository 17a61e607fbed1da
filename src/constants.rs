//! Shared constants for the engine: moderation placeholders, defaults
//! applied to first-sight profiles, and content limits.
//!
//! These constants are the defaults; deployment-specific values (admin
//! identity, duplicate-grant policy) live in [`crate::config::EngineConfig`].

// =============================================================================
// Admin Identity
// =============================================================================

/// Email address designating the platform administrator.
/// Comparison is a case-sensitive exact match against the identity's email claim.
pub const ADMIN_EMAIL: &str = "admin@heartfy.com";

/// Profile id of the platform administrator. Every profile's `following`
/// set is seeded with this id and self-heals back to containing it.
pub const ADMIN_UID: &str = "admin-uid";

/// Bio applied to the admin profile on first sight.
pub const ADMIN_BIO: &str = "Canal Oficial do Heartfy";

/// Badge pre-granted to the admin profile on first sight.
pub const OFFICIAL_BADGE_ID: &str = "official";

/// Label of the pre-granted admin badge.
pub const OFFICIAL_BADGE_LABEL: &str = "Canal Oficial";

// =============================================================================
// Sanitizer Tokens
// =============================================================================

/// Placeholder substituted for every URL in user-generated text.
pub const LINK_PLACEHOLDER: &str = "[Link Removido]";

/// Mask substituted for whole-word matches of forbidden words.
pub const WORD_MASK: &str = "***";

// =============================================================================
// Profile Defaults
// =============================================================================

/// Display name fallback when the identity provider supplies none.
pub const DEFAULT_DISPLAY_NAME: &str = "Inspirador(a)";

/// Prefix of the deterministic generated avatar, keyed by profile id.
pub const AVATAR_URL_PREFIX: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Header image applied to new profiles.
pub const DEFAULT_HEADER_PIC: &str =
    "https://images.unsplash.com/photo-1501854140801-50d01698950b?w=1200";

/// Prefix of generated handles when the identity carries no email.
pub const HANDLE_PREFIX: &str = "user_";

/// Length of the random suffix appended to generated handles.
pub const HANDLE_SUFFIX_LEN: usize = 5;

// =============================================================================
// Onboarding
// =============================================================================

/// Minimum number of declared interests required to complete onboarding.
pub const MIN_INTERESTS: usize = 3;

/// Interest tags offered during onboarding.
pub const INTEREST_OPTIONS: [&str; 19] = [
    "Fotos",
    "Amor",
    "Casais",
    "Tatuagens",
    "Carros",
    "IA",
    "Papel de Parede",
    "Patterns",
    "Decoração",
    "Moda",
    "Homens",
    "Mulheres",
    "Comida",
    "Locais",
    "Objetos",
    "Desenhos",
    "Animes",
    "Arquitetura",
    "Design",
];

// =============================================================================
// Content Limits
// =============================================================================

/// Maximum pulse body size (2KB).
pub const MAX_PULSE_SIZE: usize = 2 * 1024;

/// Maximum report reason size (4KB).
pub const MAX_REPORT_REASON_SIZE: usize = 4 * 1024;

/// Maximum badge label size (64 bytes).
pub const MAX_BADGE_LABEL_SIZE: usize = 64;

// =============================================================================
// Document Store Layout
// =============================================================================

/// Document id of the configuration singleton in the `config` collection.
pub const CONFIG_DOC_ID: &str = "global";
