use crate::agent::input_types::{AgentRequest, ImageData, Language, PageSnapshot};

/// How the generation service should format its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// A fully specified generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub format: ResponseFormat,
    pub attachment: Option<ImageData>,
}

const AUDIT_SYSTEM: &str =
    "You are a world-class digital marketing expert and automation consultant.";

const VISION_SYSTEM: &str =
    "You are a meticulous business analyst who reads documents and screenshots.";

const COPYWRITER_SYSTEM: &str = "You are a world-class copywriter.";

const ARCHITECT_SYSTEM: &str = "You are an expert Frontend Engineer and UI Designer.
Your task is to generate production-ready HTML code using Tailwind CSS based on the user's request.

RULES:
1. Return ONLY the raw HTML code. Do not include markdown backticks (```html) or explanations.
2. Use Tailwind CSS for all styling.
3. Make it look modern, premium, and beautiful (glassmorphism, gradients, rounded corners).
4. The code will be injected into a small preview container, so ensure it is RESPONSIVE.
   - Use `w-full` and `max-w-full` to prevent overflow.
   - Use `flex-wrap` or `grid-cols-1` on small screens so it fits narrow spaces.
   - Avoid fixed widths (like `w-[800px]`).
5. Use Lucide icons (<i> tags with data-lucide attribute) where appropriate.
6. Ensure text contrast is good (assume a dark background container, but you can set your own background).";

/// Builds prompts for each task. Pure: same request, same prompt.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(request: &AgentRequest) -> Prompt {
        match request {
            AgentRequest::SiteAudit { page, language } => Self::site_audit(page, *language),
            AgentRequest::ImageAnalysis { image, language } => {
                Self::image_analysis(image, *language)
            }
            AgentRequest::CopyGeneration {
                business_name,
                description,
                language,
            } => Self::copy_generation(business_name, description, *language),
            AgentRequest::UiGeneration { prompt, language } => {
                Self::ui_generation(prompt, *language)
            }
        }
    }

    /// Explicit instruction telling the model which language to answer in
    pub fn language_instruction(language: Language) -> &'static str {
        match language {
            Language::English => "Respond in English.",
            Language::Spanish => "Respond in Spanish (Español).",
            Language::Russian => {
                "Respond in Russian (Русский). Use professional marketing terminology."
            }
        }
    }

    fn site_audit(page: &PageSnapshot, language: Language) -> Prompt {
        let user = format!(
            "Analyze this website content for a business owner.
URL: {url}
Title: {title}
Description: {description}
Content Snippet: {excerpt}

{lang}

Provide a structured critique in JSON format with:
1. \"score\": A score from 0-100 based on CRO (Conversion Rate Optimization).
2. \"summary\": A 1-sentence summary of what the site does.
3. \"improvements\": A list of 3 specific, actionable marketing improvements. EACH ITEM MUST BE A STRING. Do NOT use objects. Example: [\"Change headline\", \"Add CTA\"].
4. \"quick_win\": One specific automation idea for this business.",
            url = page.url,
            title = page.title,
            description = page.description,
            excerpt = page.excerpt,
            lang = Self::language_instruction(language),
        );

        Prompt {
            system: AUDIT_SYSTEM.to_string(),
            user,
            format: ResponseFormat::Json,
            attachment: None,
        }
    }

    fn image_analysis(image: &ImageData, language: Language) -> Prompt {
        let user = format!(
            "Look at this image. It is likely a business document (receipt, invoice, spreadsheet) or a UI screenshot.

Extract the key data into a structured JSON format.
1. \"type\": Identify the document type (e.g., \"Receipt\", \"Spreadsheet\", \"Website UI\").
2. \"data\": An object of key values extracted (e.g., total amount, date, key metrics).
3. \"insight\": One business insight or anomaly detected.

{}",
            Self::language_instruction(language),
        );

        Prompt {
            system: VISION_SYSTEM.to_string(),
            user,
            format: ResponseFormat::Json,
            attachment: Some(image.clone()),
        }
    }

    fn copy_generation(business_name: &str, description: &str, language: Language) -> Prompt {
        let user = format!(
            "You are an expert copywriter. Write high-converting website copy for this business.

Business Name: {business_name}
Description: {description}
Target Language: {tag}

Return a JSON object with:
1. \"headline\": A punchy, benefit-driven H1 headline (max 8 words).
2. \"subheadline\": A persuasive H2 subheadline (max 15 words).
3. \"benefits\": A list of 3 short, punchy key benefits (max 6 words each).
4. \"cta\": A strong Call to Action button text.

{lang}",
            tag = language.tag(),
            lang = Self::language_instruction(language),
        );

        Prompt {
            system: COPYWRITER_SYSTEM.to_string(),
            user,
            format: ResponseFormat::Json,
            attachment: None,
        }
    }

    fn ui_generation(prompt: &str, language: Language) -> Prompt {
        let user = format!(
            "Build this UI component: {}\n\nWrite all visible text in the component. {}",
            prompt,
            Self::language_instruction(language),
        );

        Prompt {
            system: ARCHITECT_SYSTEM.to_string(),
            user,
            format: ResponseFormat::Text,
            attachment: None,
        }
    }
}
