use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use stockroom::api::{CmdMessage, MessageLevel};
use stockroom::model::{format_js_number, FilterSummary, Product};
use stockroom::notify::Notification;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ID_WIDTH: usize = 5;
const NAME_WIDTH: usize = 24;
const DESCRIPTION_WIDTH: usize = 32;
const PRICE_WIDTH: usize = 10;
const QTY_WIDTH: usize = 6;
const TIME_WIDTH: usize = 14;
const SHORT_ID: usize = 8;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", colorize(message.level, &message.content));
        if let Some(details) = &message.details {
            println!("  {}", details.dimmed());
        }
    }
}

pub(super) fn print_products(products: &[Product]) {
    print!("{}", render_products(products));
}

pub(super) fn print_summary(summary: &FilterSummary) {
    println!("{}", format_summary(summary).dimmed());
}

pub(super) fn print_notification(notification: &Notification) {
    print!("{}", render_notification(notification, false));
}

pub(super) fn print_notifications(notifications: &[Notification]) {
    if notifications.is_empty() {
        println!("No notifications.");
        return;
    }
    for n in notifications {
        print!("{}", render_notification(n, true));
    }
}

/// "Showing F of T products (P%) - H hidden by filters"
pub(super) fn format_summary(summary: &FilterSummary) -> String {
    format!(
        "Showing {} of {} products ({}%) - {} hidden by filters",
        summary.filtered, summary.total, summary.percentage, summary.hidden
    )
}

pub(super) fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let header = format!(
        "{:>id$}  {}  {}  {:>price$}  {:>qty$}",
        "ID",
        pad_to_width("Name", NAME_WIDTH),
        pad_to_width("Description", DESCRIPTION_WIDTH),
        "Price",
        "Qty",
        id = ID_WIDTH,
        price = PRICE_WIDTH,
        qty = QTY_WIDTH,
    );
    out.push_str(&format!("{}\n", header.bold()));

    for p in products {
        let id = p.id.map(|id| id.to_string()).unwrap_or_default();
        let name = pad_to_width(&truncate_to_width(p.display_name(), NAME_WIDTH), NAME_WIDTH);
        let description = pad_to_width(
            &truncate_to_width(p.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
            DESCRIPTION_WIDTH,
        );
        let price = p.price.map(format_price).unwrap_or_default();
        let qty = p.quantity.map(|q| q.to_string()).unwrap_or_default();
        let qty = format!("{:>width$}", qty, width = QTY_WIDTH);
        let qty = if p.effective_quantity() == 0 {
            qty.red()
        } else {
            qty.normal()
        };

        out.push_str(&format!(
            "{:>id_w$}  {}  {}  {:>price_w$}  {}\n",
            id.yellow(),
            name,
            description.dimmed(),
            price,
            qty,
            id_w = ID_WIDTH,
            price_w = PRICE_WIDTH,
        ));
    }
    out
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format_js_number(price)
    } else {
        format!("{:.2}", price)
    }
}

pub(super) fn render_notification(n: &Notification, with_time: bool) -> String {
    let short_id: String = n.id.chars().take(SHORT_ID).collect();
    let label = format!("[{}]", n.level);
    let mut line = format!(
        "{} {} {}",
        colorize(n.level, &label),
        n.message,
        short_id.dimmed()
    );
    if with_time {
        line.push_str(&format!(" {}", format_time_ago(n.timestamp).dimmed()));
    }
    line.push('\n');
    if let Some(details) = &n.details {
        line.push_str(&format!("  {}\n", details.dimmed()));
    }
    line
}

fn colorize(level: MessageLevel, text: &str) -> ColoredString {
    match level {
        MessageLevel::Info => text.dimmed(),
        MessageLevel::Success => text.green(),
        MessageLevel::Warning => text.yellow(),
        MessageLevel::Error => text.red(),
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
