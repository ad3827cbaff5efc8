//! Fallback Library: hand-written descriptions served when the model is
//! unavailable, blocked on every variant, or returns nothing usable.
//!
//! Lookup is case-insensitive against a small curated table (English and
//! Indonesian keys share one description). Unmatched concepts get one of the
//! generic templates, picked at random, with the concept text embedded.

use std::str::FromStr;

use rand::Rng;

const HAPPINESS: &str = "Kebahagiaan tergambar sebagai lukisan dengan warna kuning cerah dan \
    oranye hangat yang menyebar di seluruh kanvas. Bentuk-bentuk bulat dan lembut mengalir \
    dengan harmonis, menciptakan komposisi yang dinamis namun menenangkan.";

const LOVE: &str = "Cinta divisualisasikan dengan gradasi merah muda lembut yang berpadu dengan \
    ungu hangat. Garis-garis yang saling bertemu dan melingkar membentuk pola yang intim dan \
    penuh kehangatan.";

const PEACE: &str = "Kedamaian hadir dalam bentuk warna biru langit yang tenang berpadu dengan \
    putih lembut. Komposisi horizontal yang stabil dengan tekstur halus menciptakan kesan \
    ketenangan yang mendalam.";

const NATURE: &str = "Alam tergambar dengan hijau segar yang bervariasi dari emerald hingga \
    sage. Bentuk-bentuk organik yang mengalir natural dengan sentuhan coklat tanah dan biru \
    langit menciptakan harmoni yang sempurna.";

/// Curated entries in lookup order. Keys are lowercase.
const CURATED: &[(&[&str], &str)] = &[
    (&["happiness", "kebahagiaan"], HAPPINESS),
    (&["love", "cinta"], LOVE),
    (&["peace", "kedamaian"], PEACE),
    (&["nature", "alam"], NATURE),
];

/// Generic descriptions. Replace `{concept}` before returning.
pub const GENERIC_TEMPLATES: &[&str] = &[
    "Konsep '{concept}' tergambar sebagai lukisan dengan warna-warna yang harmonis dan \
     komposisi yang seimbang. Elemen-elemen visual berpadu menciptakan suasana yang sesuai \
     dengan makna dari konsep tersebut.",
    "Bayangkan '{concept}' di atas kanvas lebar: sapuan kuas bergradasi dari nada gelap ke \
     terang, cahaya lembut jatuh dari sudut atas, dan bentuk-bentuk abstrak yang saling \
     menyapa di tengah komposisi.",
    "'{concept}' hadir sebagai lukisan bertekstur dengan palet warna yang hangat dan sejuk \
     silih berganti. Garis-garis halus menuntun mata ke titik fokus, menghadirkan suasana \
     yang kontemplatif.",
];

/// How a concept is matched against curated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Whole concept equals a key.
    Exact,
    /// Concept contains a key anywhere ("inner peace" → peace).
    #[default]
    Substring,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchPolicy::Exact),
            "substring" => Ok(MatchPolicy::Substring),
            other => Err(format!("unknown match policy '{other}' (expected exact or substring)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FallbackLibrary {
    policy: MatchPolicy,
}

impl FallbackLibrary {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    /// Returns the curated description for a concept, if any key matches.
    pub fn curated(&self, concept: &str) -> Option<&'static str> {
        let concept = concept.trim().to_lowercase();
        CURATED
            .iter()
            .find(|(keys, _)| {
                keys.iter().any(|&key| match self.policy {
                    MatchPolicy::Exact => concept == key,
                    MatchPolicy::Substring => concept.contains(key),
                })
            })
            .map(|(_, description)| *description)
    }

    /// Total: always returns non-empty text.
    pub fn fallback(&self, concept: &str) -> String {
        self.fallback_with_rng(concept, &mut rand::thread_rng())
    }

    /// Same as `fallback`, with the template draw taken from `rng`.
    pub fn fallback_with_rng<R: Rng + ?Sized>(&self, concept: &str, rng: &mut R) -> String {
        if let Some(description) = self.curated(concept) {
            return description.to_string();
        }
        let template = GENERIC_TEMPLATES[rng.gen_range(0..GENERIC_TEMPLATES.len())];
        template.replace("{concept}", concept.trim())
    }
}
