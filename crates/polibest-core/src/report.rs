//! # Text Reports
//!
//! Plain-text renderings for the clipboard, share sheets, downloads and the
//! stored "commercial_proposal" documents.
//!
//! Calculator texts print numbers the way the price lists do
//! ([`format_number`]); kilograms and areas are printed as entered.

use chrono::NaiveDate;

use crate::calculator::{CalculatorResult, LineItem, SurfaceInput};
use crate::ledger::SavedCalculation;
use crate::library::{DocType, NewDocument};
use crate::money::{format_number, format_rounded, round_half_up};
use crate::preview::PreviewDocument;
use crate::PRODUCT_LINE;

fn header() -> String {
    format!("📊 РОЗРАХУНОК МАТЕРІАЛІВ\n{PRODUCT_LINE}\n\n")
}

fn item_line(item: &LineItem) -> String {
    format!(
        "{}: {} кг × {} = {} грн",
        item.name,
        item.kg,
        format_number(item.price_per_kg),
        format_number(item.total)
    )
}

fn full_label(input: &SurfaceInput) -> String {
    input
        .mode
        .map(|mode| mode.full_label(input.with_primer))
        .unwrap_or_default()
}

fn rounded_per_m2(value: f64) -> String {
    format_number(round_half_up(value))
}

// =============================================================================
// Calculator
// =============================================================================

/// Share text of a calculator result.
///
/// ## Example
/// ```text
/// 📊 РОЗРАХУНОК МАТЕРІАЛІВ
/// PoliBest 911
///
/// Тип: Фарба + Ґрунтівка
/// Площа: 100 м²
///
/// МАТЕРІАЛИ:
/// • Ґрунтівка: 20 кг × 720 = 14 400 грн
/// • Фарба (2 шар.): 20 кг × 990 = 19 800 грн
///
/// 💰 РАЗОМ: 34 200 грн
/// 📐 Ціна за м²: 342 грн/м²
/// ```
pub fn calculator_share_text(input: &SurfaceInput, result: &CalculatorResult) -> String {
    let mut text = header();
    text.push_str(&format!("Тип: {}\n", full_label(input)));
    text.push_str(&format!("Площа: {} м²\n\n", result.area));
    text.push_str("МАТЕРІАЛИ:\n");
    for item in &result.items {
        text.push_str(&format!("• {}\n", item_line(item)));
    }
    text.push_str(&format!("\n💰 РАЗОМ: {} грн\n", format_number(result.total)));
    text.push_str(&format!(
        "📐 Ціна за м²: {} грн/м²",
        rounded_per_m2(result.price_per_m2)
    ));
    text
}

/// Compact clipboard text, optionally addressed to a client.
pub fn calculator_copy_text(
    input: &SurfaceInput,
    result: &CalculatorResult,
    client_name: &str,
) -> String {
    let mut text = String::new();
    if !client_name.is_empty() {
        text.push_str(&format!("Клієнт: {client_name}\n\n"));
    }
    let label = input
        .mode
        .map(|mode| mode.summary_label(input.with_primer))
        .unwrap_or_default();
    text.push_str(&format!("{} | {} м²\n", label, result.area));
    for item in &result.items {
        text.push_str(&item_line(item));
        text.push('\n');
    }
    text.push_str(&format!(
        "Разом: {} грн ({} грн/м²)",
        format_number(result.total),
        rounded_per_m2(result.price_per_m2)
    ));
    text
}

/// Title of the proposal generated from a calculator result,
/// e.g. "КП - Фарба - 100м²".
pub fn calculator_document_title(input: &SurfaceInput, result: &CalculatorResult) -> String {
    let mode = input.mode.map(|m| m.display_name()).unwrap_or_default();
    format!("КП - {} - {}м²", mode, result.area)
}

/// Commercial proposal document for a calculator result.
pub fn calculator_document(
    input: &SurfaceInput,
    result: &CalculatorResult,
    client_name: &str,
    calculation_id: Option<String>,
) -> NewDocument {
    let mut content = String::from("КОМЕРЦІЙНА ПРОПОЗИЦІЯ\n\n");
    if !client_name.is_empty() {
        content.push_str(&format!("Клієнт: {client_name}\n\n"));
    }
    content.push_str(&format!(
        "Тип: {}\nПлоща: {} м²\n\n",
        full_label(input),
        result.area
    ));
    for item in &result.items {
        content.push_str(&item_line(item));
        content.push('\n');
    }
    content.push_str(&format!(
        "\nРАЗОМ: {} грн\nЦіна за м²: {} грн",
        format_number(result.total),
        rounded_per_m2(result.price_per_m2)
    ));

    NewDocument {
        title: calculator_document_title(input, result),
        doc_type: DocType::CommercialProposal,
        calculation_id,
        content,
    }
}

// =============================================================================
// Saved Calculations
// =============================================================================

fn short_date(value: &str) -> String {
    value
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Share/download text of a saved calculation.
///
/// Records without line items (older records) show coats, kilograms and
/// price per kg instead.
pub fn saved_calculation_text(calc: &SavedCalculation) -> String {
    let present = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);

    let mut text = header();
    if let Some(client) = present(&calc.client_name) {
        text.push_str(&format!("Клієнт: {client}\n"));
    }
    if let Some(date) = present(&calc.order_date) {
        text.push_str(&format!("Дата: {}\n", short_date(&date)));
    }
    if let Some(source) = present(&calc.order_source) {
        text.push_str(&format!("Джерело: {source}\n"));
    }
    text.push_str(&format!("\nПродукт: {}\n", calc.product_name));
    text.push_str(&format!("Площа: {} м²\n", calc.area_m2));

    match calc.items.as_deref() {
        Some(items) if !items.is_empty() => {
            text.push_str("\nМАТЕРІАЛИ:\n");
            for item in items {
                text.push_str(&format!("• {}\n", item_line(item)));
            }
        }
        _ => {
            text.push_str(&format!("Шари: {}\n", calc.layers));
            text.push_str(&format!("Матеріал: {:.1} кг\n", calc.total_kg));
            text.push_str(&format!(
                "Ціна за кг: {} грн\n",
                format_number(calc.price_per_kg)
            ));
        }
    }

    text.push_str(&format!(
        "\n💰 РАЗОМ: {} грн\n",
        format_number(calc.total_price)
    ));
    text.push_str(&format!(
        "📐 Ціна за м²: {} грн/м²",
        rounded_per_m2(calc.price_per_m2())
    ));
    text
}

/// File name the saved calculation downloads as.
pub fn saved_calculation_file_name(calc: &SavedCalculation) -> String {
    format!("Розрахунок_{}.txt", calc.product_name)
}

// =============================================================================
// Quote Preview
// =============================================================================

/// The proposal document as plain text, section by section.
pub fn quote_preview_text(document: &PreviewDocument) -> String {
    let money = |value: f64| format_rounded(value, document.currency);
    let company = &document.company;
    let mut out = Vec::new();

    out.push(company.name.clone());
    for (label, value) in [
        ("", company.phones.as_str()),
        ("", company.address.as_str()),
        ("ЄДРПОУ ", company.edrpou.as_str()),
        ("ІПН ", company.ipn.as_str()),
        ("ПДВ №", company.pdv.as_str()),
        ("IBAN ", company.iban.as_str()),
        ("", company.bank.as_str()),
    ] {
        if !value.is_empty() {
            out.push(format!("{label}{value}"));
        }
    }

    out.push(String::new());
    out.push("КОМЕРЦІЙНА ПРОПОЗИЦІЯ".to_string());
    out.push(document.subtitle());
    out.push(document.area_line());
    out.push(String::new());
    out.push(format!("Клієнт: {}", document.client));
    out.push(format!("Проект: {}", document.title));
    out.push(format!("Дата КП: {}", document.date));

    if let Some(description) = &document.description {
        out.push(String::new());
        out.push(description.clone());
    }

    for room in &document.rooms {
        out.push(String::new());
        out.push(format!("{} | {}", room.heading(), room.layer_label()));
        out.push("№ | Матеріал | Шари | Витрата кг/м² | К-сть кг | Ціна/кг з ПДВ | Сума з ПДВ".to_string());
        for line in &room.lines {
            out.push(format!(
                "{} | {} | {} | {:.2} | {} | {} | {}",
                line.number,
                line.name,
                line.layers,
                line.consumption,
                round_half_up(line.total_kg),
                format_number(line.price),
                format_number(round_half_up(line.sum_with_vat)),
            ));
        }
        out.push(format!("Вартість з ПДВ: {}", money(room.with_vat)));
        if let Some((percent, amount)) = room.discount {
            out.push(format!("Знижка {}%: -{}", percent, money(amount)));
        }
        out.push(format!("РАЗОМ: {}", money(room.total)));
        if let Some(time) = &room.production_time {
            out.push(format!("⏱ {time}"));
        }
        if let Some(warranty) = &room.warranty {
            out.push(format!("✓ {warranty}"));
        }
    }

    if let Some(total) = document.grand_total {
        out.push(String::new());
        out.push("Загальна вартість з ПДВ з урахуванням знижки".to_string());
        out.push(money(total));
    }

    if !document.advantages.is_empty() {
        out.push(String::new());
        out.push(format!("Переваги {PRODUCT_LINE}"));
        out.extend(document.advantages.iter().map(|a| format!("✓ {a}")));
    }

    if !document.tech_params.is_empty() {
        out.push(String::new());
        out.push("Технічні параметри".to_string());
        out.extend(
            document
                .tech_params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.value)),
        );
    }

    let signature = &document.signature;
    out.push(String::new());
    out.push("З повагою,".to_string());
    out.push(if signature.name.is_empty() {
        "________________".to_string()
    } else {
        signature.name.clone()
    });
    out.push(signature.position.clone());
    for value in [&signature.phone, &signature.email] {
        if !value.is_empty() {
            out.push(value.clone());
        }
    }

    out.push(String::new());
    out.extend(document.footer());
    out.join("\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{calculate, CalculatorPrices, CoatingMode};
    use crate::preview::QuotePreview;
    use crate::quote::{AdditionalData, MaterialLine, Quote, QuoteSettings, QuoteStatus, Room};
    use chrono::Utc;

    fn paint_with_primer() -> (SurfaceInput, CalculatorResult) {
        let input = SurfaceInput::new(CoatingMode::Paint, 100.0).with_primer(true);
        let result = calculate(&input, &CalculatorPrices::default()).unwrap();
        (input, result)
    }

    fn saved(items: Option<Vec<LineItem>>) -> SavedCalculation {
        SavedCalculation {
            id: "c1".to_string(),
            product_id: "paint".to_string(),
            product_name: "Фарба + Ґрунт".to_string(),
            client_name: Some("Іван".to_string()),
            order_date: Some("2025-01-15".to_string()),
            order_source: None,
            area_m2: 100.0,
            layers: 2,
            consumption_kg_m2: 0.4,
            total_kg: 40.0,
            price_per_kg: 855.0,
            total_price: 34_200.0,
            with_primer: true,
            lac_type: None,
            items,
            include_in_total: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_calculator_share_text() {
        let (input, result) = paint_with_primer();
        let expected = "📊 РОЗРАХУНОК МАТЕРІАЛІВ\nPoliBest 911\n\n\
                        Тип: Фарба + Ґрунтівка\n\
                        Площа: 100 м²\n\n\
                        МАТЕРІАЛИ:\n\
                        • Ґрунтівка: 20 кг × 720 = 14\u{a0}400 грн\n\
                        • Фарба (2 шар.): 20 кг × 990 = 19\u{a0}800 грн\n\
                        \n💰 РАЗОМ: 34\u{a0}200 грн\n\
                        📐 Ціна за м²: 342 грн/м²";
        assert_eq!(calculator_share_text(&input, &result), expected);
    }

    #[test]
    fn test_calculator_copy_text() {
        let (input, result) = paint_with_primer();
        let text = calculator_copy_text(&input, &result, "ТОВ Клієнт");
        assert!(text.starts_with("Клієнт: ТОВ Клієнт\n\nФарба + Ґрунт | 100 м²\n"));
        assert!(text.ends_with("Разом: 34\u{a0}200 грн (342 грн/м²)"));

        let anonymous = calculator_copy_text(&input, &result, "");
        assert!(anonymous.starts_with("Фарба + Ґрунт | 100 м²"));
    }

    #[test]
    fn test_calculator_document() {
        let (input, result) = paint_with_primer();
        let doc = calculator_document(&input, &result, "", None);
        assert_eq!(doc.title, "КП - Фарба - 100м²");
        assert_eq!(doc.doc_type, DocType::CommercialProposal);
        assert!(doc.content.starts_with("КОМЕРЦІЙНА ПРОПОЗИЦІЯ\n\nТип: Фарба + Ґрунтівка\n"));
        assert!(doc.content.ends_with("\nРАЗОМ: 34\u{a0}200 грн\nЦіна за м²: 342 грн"));
    }

    #[test]
    fn test_saved_calculation_text_with_items() {
        let (_, result) = paint_with_primer();
        let text = saved_calculation_text(&saved(Some(result.items)));
        assert!(text.contains("Клієнт: Іван\nДата: 15.01.2025\n\nПродукт: Фарба + Ґрунт\n"));
        assert!(!text.contains("Джерело"));
        assert!(text.contains("МАТЕРІАЛИ:\n• Ґрунтівка: 20 кг"));
        assert!(text.ends_with("📐 Ціна за м²: 342 грн/м²"));
    }

    #[test]
    fn test_saved_calculation_text_without_items() {
        let text = saved_calculation_text(&saved(None));
        assert!(text.contains("Шари: 2\nМатеріал: 40.0 кг\nЦіна за кг: 855 грн\n"));
        assert!(!text.contains("МАТЕРІАЛИ"));
        assert_eq!(saved_calculation_file_name(&saved(None)), "Розрахунок_Фарба + Ґрунт.txt");
    }

    #[test]
    fn test_quote_preview_text() {
        let quote = Quote {
            id: "kp".to_string(),
            title: "Склад".to_string(),
            client: "ТОВ Клієнт".to_string(),
            location: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 9),
            settings: QuoteSettings::wizard_defaults(),
            rooms: vec![Room::new(1, "Цех №1", 500.0)
                .with_material(MaterialLine::new(1, "Ґрунтівка", 0.15, 864.0))
                .with_material(MaterialLine::new(2, "Емаль", 0.30, 1512.0))],
            additional_data: AdditionalData::standard(),
            grand_total: 0.0,
            status: QuoteStatus::Draft,
            status_history: Vec::new(),
            created_at: Utc::now(),
        };
        let text = quote_preview_text(&QuotePreview::new(quote).document());

        assert!(text.contains("Дата КП: 09 березня 2025 р."));
        assert!(text.contains("Цех №1 — 500 м² | 5 шарів"));
        assert!(text.contains("1 | Ґрунтівка | 2 | 0.15 | 75 | 864 | 77\u{a0}760"));
        assert!(text.contains("Знижка 20%: -69\u{a0}984 грн"));
        assert!(text.contains("РАЗОМ: 279\u{a0}936 грн"));
        assert!(text.contains("⏱ до 9 календарних днів, після 100% оплати"));
        assert!(text.contains("________________\nКомерційний директор\n067-402-11-17"));
        assert!(text.ends_with("Ціни дійсні на момент формування пропозиції"));
    }
}
