use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use rust_decimal::Decimal;

use dereseny_core::{Currency, ParsedReceipt, PaymentStatus};

use crate::amount::parse_amount;
use crate::classify::classify;
use crate::date::parse_date;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_merchant_label,
    r"(?i)(?:merchant|vendor|store|shop|payee|paid\s+to)[:\s]+([^\n]+)");
re!(re_receiver_label,
    r"(?i)receiver[:\s]+([^\n]+)");
re!(re_line_date_like, r"^\d+[/-]\d+");
re!(re_line_amount_like, r"^\$?\d+\.?\d*$");
re!(re_line_total_prefix, r"(?i)^total");
re!(re_line_label_prefix,
    r"(?i)^(?:payment|account|payer|date|reference|reason|commission|amount)");

re!(re_reason_service,
    r"(?i)reason\s*/?\s*type\s+of\s+service[:\s]+([^\n]+)");
re!(re_reason_label,
    r"(?i)(?:description|memo|note|reason|purpose|for)[:\s]+([^\n]+)");
re!(re_reason_paid_for,
    r"(?i)(?:payment\s+for|paid\s+for)[:\s]+([^\n]+)");

re!(re_amount_transferred,
    r"(?i)transferred\s+amount[:\s]*([0-9,]+\.?\d{0,2})\s*(?:ETB|Birr)?");
re!(re_amount_debited,
    r"(?i)total\s+amount\s+debited[:\s]*([0-9,]+\.?\d{0,2})\s*(?:ETB|Birr)?");
re!(re_amount_label,
    r"(?i)(?:total|amount|price|paid|sum|balance|charge)[:\s]*\$?\s*([\d,]+\.?\d{0,2})");
re!(re_amount_after_currency,
    r"(?i)(?:ETB|USD|EUR|GBP)\s*([\d,]+\.?\d{0,2})");
re!(re_amount_dollar,
    r"\$\s*([\d,]+\.?\d{0,2})");
re!(re_amount_before_currency,
    r"(?i)([\d,]+\.\d{2})\s*(?:ETB|USD|EUR|GBP)");
re!(re_monetary_token, r"([\d,]+\.\d{2})");

re!(re_currency_code, r"(?i)\b(ETB|USD|EUR|GBP|Birr)\b");
re!(re_cbe_bank, r"(?i)commercial\s+bank\s+of\s+ethiopia|cbe");

re!(re_date_slash_composite,
    r"(?i)(\d{1,2}/\d{1,2}/\d{4}),?\s*(\d{1,2}:\d{2}:\d{2}\s*(?:AM|PM)?)");
re!(re_date_paren_composite,
    r"\(\s*(\d{2}-\d{2}-\d{4}\s+\d{2}:\d{2}:\d{2})");
re!(re_date_labeled_dmy,
    r"(?i)(?:date|on|dated|transaction\s+date)[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})");
re!(re_date_labeled_ymd,
    r"(?i)(?:date|on|dated|transaction\s+date)[:\s]+(\d{4}[/-]\d{1,2}[/-]\d{1,2})");
re!(re_date_iso_datetime,
    r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})");
re!(re_date_month_name,
    r"(?i)(\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4})");
re!(re_date_anywhere_datetime,
    r"\b(\d{2}-\d{2}-\d{4}\s+\d{2}:\d{2}:\d{2})\b");
re!(re_date_anywhere,
    r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})");

re!(re_payer_label,
    r"(?i)(?:payer|from|sender|paid\s+by)[:\s]+([^\n]+)");
re!(re_customer_label,
    r"(?i)(?:customer|client)[:\s]+([^\n]+)");

re!(re_status_labeled,
    r"(?i)status[:\s]+(completed|pending|failed|success|approved|declined)");
re!(re_status_bare,
    r"(?i)\b(completed|pending|failed|success|approved|declined)\b");
re!(re_bank_receipt,
    r"(?i)commercial\s+bank|cbe|vat\s+invoice");

re!(re_channel_mobile, r"(?i)via\s+mobile|mobile\s+banking");
re!(re_channel_label,
    r"(?i)(?:payment\s+(?:method|channel|via|through)|paid\s+(?:via|through|by))[:\s]+([^\n]+)");
re!(re_channel_keyword,
    r"(?i)\b(API|Mobile\s+Banking|App|Mobile|Web|POS|Terminal|Card|Cash|Bank\s+Transfer)\b");
re!(re_mobile_money, r"(?i)telebirr|m-pesa|mpesa");
re!(re_card_brand, r"(?i)visa|mastercard|amex|card");
re!(re_cash_word, r"(?i)\bcash\b");
re!(re_bank_word, r"(?i)bank|commercial|cbe");

re!(re_invoice_ft_code, r"(?i)\b(FT[A-Z0-9]{8,})\b");
re!(re_invoice_labeled,
    r"(?i)(?:invoice|receipt|transaction|ref(?:erence)?|order|confirmation)(?:\s+(?:no|number|#))?[:\s#]*([A-Z0-9]{6,})");
re!(re_invoice_code_shape, r"\b([A-Z]{2}\d{2}[A-Z0-9]{6,})\b");
re!(re_invoice_hash, r"#\s*([A-Z0-9]{6,})");

re!(re_source_label,
    r"(?i)(?:source|platform|via|through)[:\s]+([^\n]+)");
re!(re_source_platform,
    r"(?i)\b(Telebirr|M-Pesa|PayPal|Stripe|Square|Bank\s+Transfer)\b");
re!(re_cbe_full_name, r"(?i)commercial\s+bank\s+of\s+ethiopia");

re!(re_whitespace, r"\s+");
re!(re_tab_split, r"\s{2,}|\t+");

/// Compiled lookup patterns for one label alias: a presence check and a
/// `Label: value` capture.
struct LabelPattern {
    presence: Regex,
    capture: Regex,
}

impl LabelPattern {
    fn new(alias: &str, partial: bool) -> Self {
        let escaped = regex::escape(alias);
        let presence = if partial {
            format!("(?i){escaped}")
        } else {
            format!(r"(?i)\b{escaped}\b")
        };
        Self {
            presence: Regex::new(&presence).expect("invalid label alias"),
            capture: Regex::new(&format!(r"(?i){escaped}[:\s]+(.+)"))
                .expect("invalid label alias"),
        }
    }
}

macro_rules! labels {
    ($name:ident, partial: $partial:expr, [$($alias:expr),+ $(,)?]) => {
        fn $name() -> &'static [LabelPattern] {
            static L: OnceLock<Vec<LabelPattern>> = OnceLock::new();
            L.get_or_init(|| vec![$(LabelPattern::new($alias, $partial)),+])
        }
    };
}

labels!(receiver_labels, partial: false, ["receiver", "payee", "beneficiary"]);
labels!(reason_labels, partial: true, ["reason / type of service", "reason", "purpose"]);
labels!(transferred_amount_labels, partial: false,
    ["transferred amount", "transfer amount", "amount transferred"]);
labels!(total_amount_labels, partial: false, ["total amount debited", "total amount"]);
labels!(date_labels, partial: false,
    ["payment date", "transaction date", "date & time", "date and time"]);
labels!(payer_labels, partial: false, ["payer", "sender"]);
labels!(customer_name_labels, partial: false, ["customer name"]);
labels!(reference_labels, partial: false,
    ["reference no", "ref no", "vat invoice", "invoice no"]);

// ── Cascade machinery ─────────────────────────────────────────────────────────

/// Shared, read-only view of the winning text: the raw string, its
/// trimmed non-empty lines, and the caller-supplied payer fallback.
pub struct Ctx<'a> {
    pub text: &'a str,
    pub lines: Vec<&'a str>,
    pub payer_hint: Option<&'a str>,
}

impl<'a> Ctx<'a> {
    pub fn new(text: &'a str, payer_hint: Option<&'a str>) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        Self { text, lines, payer_hint }
    }
}

/// One step in a field's extraction cascade. The name exists so tests and
/// operators can enumerate cascade order without reading the rule bodies.
pub struct Rule<T: 'static> {
    pub name: &'static str,
    pub run: fn(&Ctx) -> Option<T>,
}

/// First rule producing a value wins; later rules are never consulted.
pub fn run_cascade<T>(rules: &[Rule<T>], ctx: &Ctx) -> Option<T> {
    rules.iter().find_map(|rule| (rule.run)(ctx))
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Line-by-line labeled-field lookup: handles `Label: value`, `Label value`,
/// and tabular `Label    value` layouts. Aliases are tried in table order.
fn find_labeled_value(ctx: &Ctx, aliases: &[LabelPattern]) -> Option<String> {
    for alias in aliases {
        for line in &ctx.lines {
            if !alias.presence.is_match(line) {
                continue;
            }
            if let Some(c) = alias.capture.captures(line) {
                let value = c[1].trim();
                if value.len() > 1 {
                    return Some(value.to_string());
                }
            }
            // Tabular layout: value sits after a run of spaces or tabs.
            let parts: Vec<&str> = re_tab_split().split(line).collect();
            if parts.len() >= 2 {
                let value = parts[parts.len() - 1].trim();
                if value.len() > 1 {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Collapse whitespace and drop OCR artifacts, keeping printable ASCII and
/// the Ethiopic block so Amharic names survive.
fn clean_text(text: &str) -> Option<String> {
    let collapsed = re_whitespace().replace_all(text.trim(), " ");
    let kept: String = collapsed
        .chars()
        .filter(|&c| ('\x20'..='\x7e').contains(&c) || ('\u{1200}'..='\u{137f}').contains(&c))
        .collect();
    let trimmed = kept.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

// ── Merchant ──────────────────────────────────────────────────────────────────

fn merchant_labeled_receiver(ctx: &Ctx) -> Option<String> {
    find_labeled_value(ctx, receiver_labels())
        .as_deref()
        .and_then(clean_text)
}

fn merchant_generic_label(ctx: &Ctx) -> Option<String> {
    first_capture(re_merchant_label(), ctx.text)
        .or_else(|| first_capture(re_receiver_label(), ctx.text))
        .as_deref()
        .and_then(clean_text)
}

/// First line that is not date-like, amount-like, "total"-prefixed, or a
/// known label, and is long enough to be a business name.
fn merchant_first_plausible_line(ctx: &Ctx) -> Option<String> {
    ctx.lines
        .iter()
        .find(|line| {
            !re_line_date_like().is_match(line)
                && !re_line_amount_like().is_match(line)
                && !re_line_total_prefix().is_match(line)
                && !re_line_label_prefix().is_match(line)
                && line.len() > 3
        })
        .and_then(|line| clean_text(line))
}

pub static MERCHANT_RULES: &[Rule<String>] = &[
    Rule { name: "labeled_receiver", run: merchant_labeled_receiver },
    Rule { name: "generic_label", run: merchant_generic_label },
    Rule { name: "first_plausible_line", run: merchant_first_plausible_line },
];

// ── Payment reason ────────────────────────────────────────────────────────────

fn reason_labeled(ctx: &Ctx) -> Option<String> {
    find_labeled_value(ctx, reason_labels())
        .as_deref()
        .and_then(clean_text)
}

fn reason_generic_label(ctx: &Ctx) -> Option<String> {
    first_capture(re_reason_service(), ctx.text)
        .or_else(|| first_capture(re_reason_label(), ctx.text))
        .or_else(|| first_capture(re_reason_paid_for(), ctx.text))
        .as_deref()
        .and_then(clean_text)
}

/// Canned descriptions for common payment types when nothing is labeled.
fn reason_payment_type(ctx: &Ctx) -> Option<String> {
    static TYPES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let table = TYPES.get_or_init(|| {
        [
            (r"(?i)fuel|gas|petrol", "Fuel Payment"),
            (r"(?i)food|restaurant|dining|meal", "Food & Dining"),
            (r"(?i)transport|taxi|uber|lyft|ride", "Transportation"),
            (r"(?i)grocery|supermarket|store", "Groceries"),
            (r"(?i)hotel|accommodation|lodging", "Accommodation"),
            (r"(?i)office|supplies|equipment", "Office Supplies"),
            (r"(?i)payment\s+done\s+via\s+mobile", "Mobile Payment"),
            (r"(?i)mobile\s+banking", "Mobile Banking Transfer"),
        ]
        .into_iter()
        .map(|(pat, label)| (Regex::new(pat).expect("invalid regex"), label))
        .collect()
    });
    table
        .iter()
        .find(|(re, _)| re.is_match(ctx.text))
        .map(|(_, label)| label.to_string())
}

pub static REASON_RULES: &[Rule<String>] = &[
    Rule { name: "labeled_reason", run: reason_labeled },
    Rule { name: "generic_label", run: reason_generic_label },
    Rule { name: "payment_type_keyword", run: reason_payment_type },
];

// ── Amount ────────────────────────────────────────────────────────────────────

fn amount_labeled_transferred(ctx: &Ctx) -> Option<Decimal> {
    find_labeled_value(ctx, transferred_amount_labels())
        .as_deref()
        .and_then(parse_amount)
}

fn amount_labeled_total_debited(ctx: &Ctx) -> Option<Decimal> {
    find_labeled_value(ctx, total_amount_labels())
        .as_deref()
        .and_then(parse_amount)
}

/// Inline labeled amounts: `Total: 45.00`, `Amount 4581.00 ETB`, …
fn amount_inline_label(ctx: &Ctx) -> Option<Decimal> {
    [re_amount_transferred(), re_amount_debited(), re_amount_label()]
        .into_iter()
        .find_map(|re| first_capture(re, ctx.text).as_deref().and_then(parse_amount))
}

/// Bare number adjacent to a currency marker.
fn amount_currency_adjacent(ctx: &Ctx) -> Option<Decimal> {
    [re_amount_after_currency(), re_amount_dollar(), re_amount_before_currency()]
        .into_iter()
        .find_map(|re| first_capture(re, ctx.text).as_deref().and_then(parse_amount))
}

/// Last resort: the largest token shaped like money anywhere in the text.
fn amount_largest_monetary_token(ctx: &Ctx) -> Option<Decimal> {
    re_monetary_token()
        .captures_iter(ctx.text)
        .filter_map(|c| parse_amount(c.get(1)?.as_str()))
        .max()
}

pub static AMOUNT_RULES: &[Rule<Decimal>] = &[
    Rule { name: "labeled_transferred_amount", run: amount_labeled_transferred },
    Rule { name: "labeled_total_debited", run: amount_labeled_total_debited },
    Rule { name: "inline_label", run: amount_inline_label },
    Rule { name: "currency_adjacent", run: amount_currency_adjacent },
    Rule { name: "largest_monetary_token", run: amount_largest_monetary_token },
];

// ── Currency ──────────────────────────────────────────────────────────────────

fn currency_explicit_code(ctx: &Ctx) -> Option<Currency> {
    first_capture(re_currency_code(), ctx.text)?.parse().ok()
}

/// A known national bank on the slip implies its home currency.
fn currency_bank_inference(ctx: &Ctx) -> Option<Currency> {
    re_cbe_bank().is_match(ctx.text).then_some(Currency::Etb)
}

fn currency_default_etb(_ctx: &Ctx) -> Option<Currency> {
    Some(Currency::Etb)
}

pub static CURRENCY_RULES: &[Rule<Currency>] = &[
    Rule { name: "explicit_code", run: currency_explicit_code },
    Rule { name: "bank_inference", run: currency_bank_inference },
    Rule { name: "default_etb", run: currency_default_etb },
];

// ── Date ──────────────────────────────────────────────────────────────────────

fn date_labeled_field(ctx: &Ctx) -> Option<NaiveDateTime> {
    find_labeled_value(ctx, date_labels())
        .as_deref()
        .and_then(parse_date)
}

/// CBE app export: "2/12/2026, 3:31:00 PM".
fn date_slash_composite(ctx: &Ctx) -> Option<NaiveDateTime> {
    let c = re_date_slash_composite().captures(ctx.text)?;
    let joined = format!("{} {}", c.get(1)?.as_str(), c.get(2)?.as_str());
    parse_date(&joined)
}

/// Telebirr slips print "(05-01-2026 19:46:30" inside a table cell.
fn date_paren_composite(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_paren_composite(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

fn date_labeled_dmy(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_labeled_dmy(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

fn date_labeled_ymd(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_labeled_ymd(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

fn date_iso_datetime(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_iso_datetime(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

fn date_month_name(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_month_name(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

fn date_anywhere_datetime(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_anywhere_datetime(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

fn date_anywhere(ctx: &Ctx) -> Option<NaiveDateTime> {
    first_capture(re_date_anywhere(), ctx.text)
        .as_deref()
        .and_then(parse_date)
}

pub static DATE_RULES: &[Rule<NaiveDateTime>] = &[
    Rule { name: "labeled_field", run: date_labeled_field },
    Rule { name: "slash_composite", run: date_slash_composite },
    Rule { name: "paren_composite", run: date_paren_composite },
    Rule { name: "labeled_dmy", run: date_labeled_dmy },
    Rule { name: "labeled_ymd", run: date_labeled_ymd },
    Rule { name: "iso_datetime", run: date_iso_datetime },
    Rule { name: "month_name", run: date_month_name },
    Rule { name: "anywhere_datetime", run: date_anywhere_datetime },
    Rule { name: "anywhere_date", run: date_anywhere },
];

// ── Payer ─────────────────────────────────────────────────────────────────────

fn payer_labeled(ctx: &Ctx) -> Option<String> {
    find_labeled_value(ctx, payer_labels())
        .as_deref()
        .and_then(clean_text)
}

fn payer_customer_name(ctx: &Ctx) -> Option<String> {
    find_labeled_value(ctx, customer_name_labels())
        .as_deref()
        .and_then(clean_text)
}

fn payer_generic_label(ctx: &Ctx) -> Option<String> {
    first_capture(re_payer_label(), ctx.text)
        .or_else(|| first_capture(re_customer_label(), ctx.text))
        .as_deref()
        .and_then(clean_text)
}

/// Fall back to the authenticated user's display name when the upstream
/// caller supplied one.
fn payer_user_hint(ctx: &Ctx) -> Option<String> {
    ctx.payer_hint.and_then(clean_text)
}

pub static PAYER_RULES: &[Rule<String>] = &[
    Rule { name: "labeled_payer", run: payer_labeled },
    Rule { name: "labeled_customer_name", run: payer_customer_name },
    Rule { name: "generic_label", run: payer_generic_label },
    Rule { name: "user_hint", run: payer_user_hint },
];

// ── Status ────────────────────────────────────────────────────────────────────

fn status_labeled(ctx: &Ctx) -> Option<PaymentStatus> {
    first_capture(re_status_labeled(), ctx.text)
        .as_deref()
        .and_then(PaymentStatus::from_keyword)
}

fn status_bare_keyword(ctx: &Ctx) -> Option<PaymentStatus> {
    first_capture(re_status_bare(), ctx.text)
        .as_deref()
        .and_then(PaymentStatus::from_keyword)
}

/// A receipt with a reference number already settled.
fn status_invoice_implies_completed(ctx: &Ctx) -> Option<PaymentStatus> {
    run_cascade(INVOICE_RULES, ctx).map(|_| PaymentStatus::Completed)
}

fn status_bank_receipt(ctx: &Ctx) -> Option<PaymentStatus> {
    re_bank_receipt()
        .is_match(ctx.text)
        .then_some(PaymentStatus::Completed)
}

fn status_default_pending(_ctx: &Ctx) -> Option<PaymentStatus> {
    Some(PaymentStatus::Pending)
}

pub static STATUS_RULES: &[Rule<PaymentStatus>] = &[
    Rule { name: "labeled_status", run: status_labeled },
    Rule { name: "bare_keyword", run: status_bare_keyword },
    Rule { name: "invoice_implies_completed", run: status_invoice_implies_completed },
    Rule { name: "bank_receipt", run: status_bank_receipt },
    Rule { name: "default_pending", run: status_default_pending },
];

// ── Payment channel ───────────────────────────────────────────────────────────

fn channel_mobile_banking(ctx: &Ctx) -> Option<String> {
    re_channel_mobile()
        .is_match(ctx.text)
        .then(|| "Mobile Banking".to_string())
}

fn channel_labeled(ctx: &Ctx) -> Option<String> {
    first_capture(re_channel_label(), ctx.text)
        .as_deref()
        .and_then(clean_text)
}

fn channel_keyword(ctx: &Ctx) -> Option<String> {
    first_capture(re_channel_keyword(), ctx.text)
        .as_deref()
        .and_then(clean_text)
}

fn channel_platform(ctx: &Ctx) -> Option<String> {
    if re_mobile_money().is_match(ctx.text) {
        return Some("Mobile/App".to_string());
    }
    if re_card_brand().is_match(ctx.text) {
        return Some("Card".to_string());
    }
    if re_cash_word().is_match(ctx.text) {
        return Some("Cash".to_string());
    }
    if re_bank_word().is_match(ctx.text) {
        return Some("Bank Transfer".to_string());
    }
    None
}

fn channel_default_unknown(_ctx: &Ctx) -> Option<String> {
    Some("Unknown".to_string())
}

pub static CHANNEL_RULES: &[Rule<String>] = &[
    Rule { name: "mobile_banking_phrase", run: channel_mobile_banking },
    Rule { name: "labeled_channel", run: channel_labeled },
    Rule { name: "channel_keyword", run: channel_keyword },
    Rule { name: "platform_keyword", run: channel_platform },
    Rule { name: "default_unknown", run: channel_default_unknown },
];

// ── Invoice / reference number ────────────────────────────────────────────────

fn invoice_labeled_reference(ctx: &Ctx) -> Option<String> {
    let value = find_labeled_value(ctx, reference_labels())?;
    let value = value.trim();
    // Minimum length rejects OCR shrapnel picked up next to the label.
    (value.len() >= 5).then(|| value.to_uppercase())
}

/// CBE transaction codes look like FT26043ZZDBJ.
fn invoice_ft_code(ctx: &Ctx) -> Option<String> {
    first_capture(re_invoice_ft_code(), ctx.text).map(|s| s.to_uppercase())
}

fn invoice_generic_code(ctx: &Ctx) -> Option<String> {
    first_capture(re_invoice_labeled(), ctx.text)
        .or_else(|| first_capture(re_invoice_code_shape(), ctx.text))
        .or_else(|| first_capture(re_invoice_hash(), ctx.text))
        .map(|s| s.to_uppercase())
}

pub static INVOICE_RULES: &[Rule<String>] = &[
    Rule { name: "labeled_reference", run: invoice_labeled_reference },
    Rule { name: "ft_code", run: invoice_ft_code },
    Rule { name: "generic_code", run: invoice_generic_code },
];

// ── Source ────────────────────────────────────────────────────────────────────

fn source_cbe(ctx: &Ctx) -> Option<String> {
    re_cbe_full_name()
        .is_match(ctx.text)
        .then(|| "Commercial Bank of Ethiopia (CBE)".to_string())
}

fn source_labeled(ctx: &Ctx) -> Option<String> {
    first_capture(re_source_label(), ctx.text)
        .or_else(|| first_capture(re_source_platform(), ctx.text))
        .as_deref()
        .and_then(clean_text)
}

fn source_known_platform(ctx: &Ctx) -> Option<String> {
    static PLATFORMS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let table = PLATFORMS.get_or_init(|| {
        [
            (r"(?i)telebirr", "Telebirr"),
            (r"(?i)m-pesa|mpesa", "M-Pesa"),
            (r"(?i)paypal", "PayPal"),
            (r"(?i)awash", "Awash Bank"),
            (r"(?i)dashen", "Dashen Bank"),
            (r"(?i)abyssinia", "Abyssinia Bank"),
        ]
        .into_iter()
        .map(|(pat, label)| (Regex::new(pat).expect("invalid regex"), label))
        .collect()
    });
    table
        .iter()
        .find(|(re, _)| re.is_match(ctx.text))
        .map(|(_, label)| label.to_string())
}

pub static SOURCE_RULES: &[Rule<String>] = &[
    Rule { name: "cbe_full_name", run: source_cbe },
    Rule { name: "labeled_source", run: source_labeled },
    Rule { name: "known_platform", run: source_known_platform },
];

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Run every field cascade over the winning text and assemble the
    /// structured record. A field whose cascade comes up empty is absent,
    /// never an error; the record shape is always complete.
    pub fn parse(text: &str, payer_hint: Option<&str>) -> ParsedReceipt {
        let ctx = Ctx::new(text, payer_hint);

        let payment_date = run_cascade(DATE_RULES, &ctx).unwrap_or_else(|| {
            tracing::warn!("No date pattern matched, defaulting to now");
            chrono::Local::now().naive_local()
        });

        ParsedReceipt {
            merchant_name: run_cascade(MERCHANT_RULES, &ctx),
            payment_reason: run_cascade(REASON_RULES, &ctx),
            amount: run_cascade(AMOUNT_RULES, &ctx),
            currency: run_cascade(CURRENCY_RULES, &ctx).unwrap_or_default(),
            payment_date,
            payer_name: run_cascade(PAYER_RULES, &ctx),
            status: run_cascade(STATUS_RULES, &ctx).unwrap_or_default(),
            payment_channel: run_cascade(CHANNEL_RULES, &ctx),
            invoice_no: run_cascade(INVOICE_RULES, &ctx),
            source: run_cascade(SOURCE_RULES, &ctx),
            category: classify(text),
            raw_text: text.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
