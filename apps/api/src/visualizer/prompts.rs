// Prompt variants for the visualize pipeline.
// Ordered from most instructed to plainest; later variants are only tried when
// earlier ones are blocked or come back unusable.

/// Richly instructed Indonesian variant. Replace `{concept}` before sending.
pub const PAINTING_PROMPT_TEMPLATE: &str = "Deskripsikan '{concept}' sebagai lukisan dalam \
    Bahasa Indonesia. Fokus pada warna, bentuk, dan suasana. Gunakan format: ## untuk judul, \
    **tebal** untuk penekanan. Buat deskripsi yang lengkap tapi ringkas.";

/// Softer Indonesian phrasing ("artwork" instead of "painting").
pub const ARTWORK_PROMPT_TEMPLATE: &str = "Gambarkan konsep '{concept}' sebagai karya seni \
    visual dalam Bahasa Indonesia. Jelaskan komposisi, warna, dan atmosfer dengan format \
    markdown yang rapi.";

/// English phrasing, last resort against over-eager safety screening.
pub const ENGLISH_PROMPT_TEMPLATE: &str = "Visual description of '{concept}' as artwork in \
    Indonesian. Include colors, composition, mood. Use markdown format. \
    Keep it complete but concise.";

const VARIANT_TEMPLATES: &[&str] = &[
    PAINTING_PROMPT_TEMPLATE,
    ARTWORK_PROMPT_TEMPLATE,
    ENGLISH_PROMPT_TEMPLATE,
];

/// Appended once to output the model cut off at the token limit.
pub const TRUNCATION_NOTICE: &str = "\n\n---\n*💡 Deskripsi ini dipotong karena terlalu panjang. \
    Coba gunakan konsep yang lebih spesifik untuk hasil yang lebih fokus.*";

/// Builds the ordered prompt variants for a concept. Never empty.
///
/// The caller is responsible for rejecting blank concepts first.
pub fn build_variants(concept: &str) -> Vec<String> {
    let concept = concept.trim();
    VARIANT_TEMPLATES
        .iter()
        .map(|template| template.replace("{concept}", concept))
        .collect()
}
