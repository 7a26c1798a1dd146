use serde_json::{json, Value};

use crate::agent::input_types::{AgentRequest, Language, TaskKind};
use crate::agent::output_types::Payload;

const DEFAULT_SITE: &str = "example.com";
const DEFAULT_BUSINESS: &str = "Your Business";
const DEFAULT_COMPONENT: &str = "a landing page hero section";

/// Values interpolated into the canned payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockContext<'a> {
    pub site: &'a str,
    pub business_name: &'a str,
    pub prompt: &'a str,
}

impl Default for MockContext<'_> {
    fn default() -> Self {
        Self {
            site: DEFAULT_SITE,
            business_name: DEFAULT_BUSINESS,
            prompt: DEFAULT_COMPONENT,
        }
    }
}

impl<'a> MockContext<'a> {
    /// Take the request's own subject, keeping placeholders for the rest
    pub fn from_request(request: &'a AgentRequest) -> Self {
        let defaults = Self::default();
        match request {
            AgentRequest::SiteAudit { page, .. } => Self {
                site: page.url.as_str(),
                ..defaults
            },
            AgentRequest::ImageAnalysis { .. } => defaults,
            AgentRequest::CopyGeneration { business_name, .. } => Self {
                business_name: business_name.as_str(),
                ..defaults
            },
            AgentRequest::UiGeneration { prompt, .. } => Self {
                prompt: prompt.as_str(),
                ..defaults
            },
        }
    }
}

/// Deterministic offline responses, one table per (task, language).
pub struct MockProvider;

impl MockProvider {
    pub fn mock(kind: TaskKind, language: Language, context: &MockContext) -> Payload {
        let value = match kind {
            TaskKind::SiteAudit => site_audit(language, context.site),
            TaskKind::ImageAnalysis => image_analysis(language),
            TaskKind::CopyGeneration => copy_generation(language, context.business_name),
            TaskKind::UiGeneration => ui_generation(language, context.prompt),
        };
        into_payload(value)
    }

    /// Canned payload personalised with the request's subject (URL, business name, UI prompt)
    pub fn for_request(request: &AgentRequest) -> Payload {
        Self::mock(
            request.kind(),
            request.language(),
            &MockContext::from_request(request),
        )
    }
}

fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(payload) => payload,
        _ => Payload::new(),
    }
}

fn site_audit(language: Language, url: &str) -> Value {
    match language {
        Language::Russian => json!({
            "score": 72,
            "summary": format!("Бизнес-сайт {}, которому не хватает уникального торгового предложения.", url),
            "improvements": [
                "Добавьте четкий призыв к действию (CTA) на первом экране.",
                "Используйте социальные доказательства (отзывы).",
                "Оптимизируйте скорость загрузки изображений."
            ],
            "quick_win": "Настройте автоответчик для контактной формы."
        }),
        Language::Spanish => json!({
            "score": 72,
            "summary": format!("Un sitio web comercial en {} que podría usar mejores propuestas de valor.", url),
            "improvements": [
                "Agregue una llamada a la acción (CTA) clara.",
                "Use pruebas sociales (testimonios).",
                "Optimice la velocidad de carga de las imágenes."
            ],
            "quick_win": "Configure una respuesta automática para el formulario de contacto."
        }),
        Language::English => json!({
            "score": 72,
            "summary": format!("A business website at {} that could use better value propositions.", url),
            "improvements": [
                "Add a clear Call-to-Action (CTA) above the fold.",
                "Use social proof (testimonials) to build trust.",
                "Optimize image loading speed for mobile users."
            ],
            "quick_win": "Set up an auto-responder for the contact form."
        }),
    }
}

fn image_analysis(language: Language) -> Value {
    let (kind, insight) = match language {
        Language::Russian => (
            "Чек (демо-анализ)",
            "Расходы в этой категории на 15% выше среднего за прошлый месяц.",
        ),
        Language::Spanish => (
            "Recibo (análisis de demostración)",
            "Esta categoría de gasto es un 15% más alta que el promedio del mes pasado.",
        ),
        Language::English => (
            "Receipt (Mock Analysis)",
            "This expense category is 15% higher than last month's average.",
        ),
    };

    json!({
        "type": kind,
        "data": {
            "Merchant": "Office Supplies Co.",
            "Date": "2023-11-24",
            "Total": "$145.20",
            "Items": ["Printer Paper", "Ink Cartridges"]
        },
        "insight": insight
    })
}

fn copy_generation(language: Language, business_name: &str) -> Value {
    match language {
        Language::Russian => json!({
            "headline": format!("Лучшее от {}", business_name),
            "subheadline": "Премиальное качество и отличный сервис.",
            "benefits": ["Высокое качество", "Поддержка 24/7", "Гарантия результата"],
            "cta": "Начать сейчас"
        }),
        Language::Spanish => json!({
            "headline": format!("Lo Mejor de {}", business_name),
            "subheadline": "Servicios de calidad premium entregados con excelencia.",
            "benefits": ["Calidad Inigualable", "Soporte 24/7", "Satisfacción Garantizada"],
            "cta": "Empezar Hoy"
        }),
        Language::English => json!({
            "headline": format!("Experience the Best of {}", business_name),
            "subheadline": "Premium quality services delivered with excellence and care.",
            "benefits": ["Unmatched Quality", "24/7 Customer Support", "Satisfaction Guaranteed"],
            "cta": "Get Started Today"
        }),
    }
}

fn ui_generation(language: Language, prompt: &str) -> Value {
    let (title, intro) = match language {
        Language::Russian => ("Демо-режим: Архитектор", "Я бы сгенерировал интерфейс для"),
        Language::Spanish => ("Modo demo: Agente Arquitecto", "Generaría una interfaz para"),
        Language::English => ("Mock Mode: Architect Agent", "I would generate a UI for"),
    };

    let html = format!(
        r#"<div class="p-8 text-center border-2 border-dashed border-slate-700 rounded-xl">
    <h3 class="text-xl font-bold text-white mb-2">{title}</h3>
    <p class="text-slate-400 mb-4">{intro}: "{prompt}"</p>
    <div class="bg-slate-800 p-4 rounded text-left font-mono text-xs text-green-400">
        &lt;div class="bg-white p-6 rounded-lg shadow-lg"&gt;<br>
        &nbsp;&nbsp;&lt;h1 class="text-2xl font-bold"&gt;Hello World&lt;/h1&gt;<br>
        &lt;/div&gt;
    </div>
</div>"#,
        prompt = escape_html(prompt),
    );

    json!({ "html": html })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::output_types::Schema;

    const LANGUAGES: [Language; 3] = [Language::English, Language::Spanish, Language::Russian];

    #[test]
    fn every_mock_satisfies_its_schema() {
        for kind in TaskKind::ALL {
            for language in LANGUAGES {
                let payload = MockProvider::mock(kind, language, &MockContext::default());
                Schema::for_task(kind)
                    .validate(&payload)
                    .unwrap_or_else(|e| panic!("{} / {:?}: {}", kind, language, e));
            }
        }
    }

    #[test]
    fn mocks_are_byte_identical_across_calls() {
        for kind in TaskKind::ALL {
            for language in LANGUAGES {
                let first = serde_json::to_string(&MockProvider::mock(kind, language, &MockContext::default())).unwrap();
                let second = serde_json::to_string(&MockProvider::mock(kind, language, &MockContext::default())).unwrap();
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn russian_copy_names_the_business() {
        let payload = MockProvider::mock(
            TaskKind::CopyGeneration,
            Language::Russian,
            &MockContext {
                business_name: "Onda",
                ..MockContext::default()
            },
        );
        assert_eq!(payload["headline"], "Лучшее от Onda");
        assert_eq!(payload["benefits"].as_array().unwrap().len(), 3);
        assert_eq!(payload["cta"], "Начать сейчас");
    }

    #[test]
    fn audit_mock_mentions_url() {
        let context = MockContext {
            site: "https://onda.dev",
            ..MockContext::default()
        };
        let payload = MockProvider::mock(TaskKind::SiteAudit, Language::English, &context);
        assert!(payload["summary"].as_str().unwrap().contains("https://onda.dev"));
        assert_eq!(payload["score"], 72);
    }

    #[test]
    fn ui_mock_escapes_prompt() {
        let context = MockContext {
            prompt: "<script>alert(1)</script>",
            ..MockContext::default()
        };
        let payload = MockProvider::mock(TaskKind::UiGeneration, Language::English, &context);
        let html = payload["html"].as_str().unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn context_takes_the_request_subject() {
        let request = AgentRequest::CopyGeneration {
            business_name: "Onda".to_string(),
            description: "AI automation".to_string(),
            language: Language::Spanish,
        };
        let context = MockContext::from_request(&request);
        assert_eq!(context.business_name, "Onda");
        assert_eq!(context.site, DEFAULT_SITE);
        assert_eq!(
            MockProvider::for_request(&request)["headline"],
            "Lo Mejor de Onda"
        );
    }
}
