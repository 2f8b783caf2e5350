use crate::lookup::{Renderer, StatusKind, StatusSink};
use crate::models::{LookupRecord, Principal};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use colored::Colorize;
use indicatif::ProgressBar;
use serde_json::Value;
use std::time::Duration;

/// Storage key for the display theme token. Lives in the same store as the
/// recency list but under its own key.
pub const THEME_KEY: &str = "cisp_theme";

// Row caps, matching what the dashboard layout will show.
const MAX_ROWS: usize = 200;
const MAX_SEGMENTS: usize = 50;

// ============ Formatting ============

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Formats a monetary amount in pt-BR style ("R$ 1.234,56").
pub fn fmt_currency(v: Option<f64>) -> String {
    match v {
        Some(v) => {
            let negative = v < 0.0;
            let cents = (v.abs() * 100.0).round() as u64;
            format!(
                "{}R$ {},{:02}",
                if negative { "-" } else { "" },
                group_thousands(cents / 100),
                cents % 100
            )
        }
        None => "-".to_string(),
    }
}

/// Formats an integer count with pt-BR thousands separators.
pub fn fmt_count(v: Option<i64>) -> String {
    match v {
        Some(n) if n < 0 => format!("-{}", group_thousands(n.unsigned_abs())),
        Some(n) => group_thousands(n as u64),
        None => "-".to_string(),
    }
}

/// Formats a backend timestamp as "dd/mm/yyyy hh:mm" (or just the date).
/// Unparseable values are shown as-is.
pub fn fmt_datetime(v: &Option<String>) -> String {
    let raw = match v.as_deref() {
        None | Some("") => return "-".to_string(),
        Some(raw) => raw,
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

/// Date part of a timestamp, for table rows.
pub fn fmt_day(v: &Option<String>) -> String {
    match v.as_deref() {
        None | Some("") => "-".to_string(),
        Some(raw) => raw
            .split('T')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("-")
            .to_string(),
    }
}

/// Opaque peer/alert codes arrive as either strings or numbers.
pub fn fmt_code(v: &Option<Value>) -> String {
    match v {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "-".to_string(),
    }
}

fn text(v: &Option<String>) -> &str {
    match v.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => "-",
    }
}

// ============ Status sink ============

/// Status badge, toast notices, and loading spinner on the terminal.
#[derive(Default)]
pub struct TerminalStatus {
    spinner: Option<ProgressBar>,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self::default()
    }

    fn badge(kind: StatusKind) -> colored::ColoredString {
        match kind {
            StatusKind::Idle => "WAITING".dimmed(),
            StatusKind::Working => "WORKING".blue().bold(),
            StatusKind::Ok => "READY".green().bold(),
            StatusKind::Warning => "ATTENTION".yellow().bold(),
            StatusKind::Error => "ERROR".red().bold(),
        }
    }
}

impl StatusSink for TerminalStatus {
    fn set_status(&mut self, kind: StatusKind, status_text: &str) {
        let line = format!("[{}] {}", Self::badge(kind), status_text);
        match &self.spinner {
            Some(spinner) => spinner.set_message(line),
            None => println!("{}", line),
        }
    }

    fn notify(&mut self, message: &str) {
        let line = format!("{} {}", "•".cyan(), message);
        match &self.spinner {
            Some(spinner) => spinner.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            if self.spinner.is_none() {
                let spinner = ProgressBar::new_spinner();
                spinner.enable_steady_tick(Duration::from_millis(120));
                self.spinner = Some(spinner);
            }
        } else if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

// ============ Renderer ============

/// Paints a lookup record into the fixed dashboard layout.
#[derive(Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub fn new() -> Self {
        Self
    }

    fn section(title: &str) {
        println!();
        println!("{}", title.bold().underline());
    }

    fn field(label: &str, value: &str) {
        println!("  {:<22} {}", format!("{}:", label).dimmed(), value);
    }

    fn none_recorded() {
        println!("  {}", "None recorded.".dimmed());
    }

    fn render_principal(p: &Principal) {
        println!();
        println!("{}", text(&p.razao_social).bold());
        Self::field("Trade name", text(&p.nome_fantasia));
        Self::field("CNPJ", text(&p.cnpj));
        Self::field("Federal status", text(&p.situacao_receita_federal));
        Self::field("CNAE", text(&p.cnae));
        Self::field("Activity", text(&p.descricao_atividade_fiscal));
        Self::field("Founded", &fmt_datetime(&p.data_fundacao));
        Self::field("Included in CISP", &fmt_datetime(&p.data_inclusao_cisp));
        Self::field("Modified at", &fmt_datetime(&p.data_atualizacao));
        Self::field("Modification time", text(&p.hora_modificacao));
        Self::field("Modified by", text(&p.usuario_modificacao));
        Self::field("Sintegra status", text(&p.situacao_sintegra));

        let address: Vec<&str> = [&p.endereco, &p.bairro, &p.cidade, &p.uf, &p.cep]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();
        let address = if address.is_empty() {
            "-".to_string()
        } else {
            address.join(", ")
        };
        Self::field("Address", &address);

        if p.data_atualizacao.is_some() {
            println!(
                "  {}",
                format!("Updated at {}", fmt_datetime(&p.data_atualizacao)).dimmed()
            );
        }

        Self::section("Metrics");
        Self::field(
            "Current rating",
            &format!(
                "{} {}",
                text(&p.rating_atual),
                p.descricao_rating.as_deref().unwrap_or("")
            ),
        );
        Self::field("Current debt", &fmt_currency(p.total_debito_atual));
        Self::field("Credit limit", &fmt_currency(p.total_limite_credito));
        Self::field(
            "Highest accumulation",
            &format!(
                "{} ({})",
                fmt_currency(p.total_maior_acumulo),
                fmt_datetime(&p.data_maior_acumulo)
            ),
        );
        Self::field(
            "Overdue 5/15/30d",
            &format!(
                "{} / {} / {}",
                fmt_currency(p.total_debito_vencido_05_dias),
                fmt_currency(p.total_debito_vencido_15_dias),
                fmt_currency(p.total_debito_vencido_30_dias)
            ),
        );
        let last_purchase = match &p.codigo_associada_ultima_compra {
            Some(code) => format!(
                "{} (peer {})",
                fmt_datetime(&p.data_ultima_compra),
                fmt_code(&Some(code.clone()))
            ),
            None => fmt_datetime(&p.data_ultima_compra),
        };
        Self::field("Last purchase", &last_purchase);
        Self::field(
            "Selling peers, 2 months",
            &fmt_count(p.qtd_associadas_vendas_ultimos_2meses),
        );
    }

    fn render_collections(record: &LookupRecord) {
        Self::section("Restrictive records");
        if record.restritivas.is_empty() {
            Self::none_recorded();
        } else {
            for r in record.restritivas.iter().take(MAX_ROWS) {
                println!(
                    "  {:<12} {:<40} {}",
                    fmt_day(&r.data_ocorrencia),
                    text(&r.descricao_primeira_restritiva),
                    text(&r.razao_social)
                );
            }
        }

        Self::section("Alerts");
        if record.alertas.is_empty() {
            Self::none_recorded();
        } else {
            for a in record.alertas.iter().take(MAX_ROWS) {
                println!(
                    "  {:<12} {:<40} {}",
                    fmt_day(&a.data_atualizacao),
                    text(&a.descricao_alerta),
                    text(&a.razao_social)
                );
            }
        }

        Self::section("Positive records by segment");
        if record.positiva_segmentos.is_empty() {
            Self::none_recorded();
        } else {
            for seg in record.positiva_segmentos.iter().take(MAX_SEGMENTS) {
                println!(
                    "  {} • peers: {} • debt: {}",
                    text(&seg.descricao_segmento).bold(),
                    fmt_count(seg.total_associadas_segmento),
                    fmt_currency(seg.valor_total_debito_segmento)
                );
                for pos in seg.positivas.iter().take(MAX_ROWS) {
                    println!(
                        "    {:<12} {:<12} {:>16} {:<30} {:>16} {:>16}",
                        fmt_day(&pos.data_ultima_compra),
                        fmt_day(&pos.data_maior_acumulo),
                        fmt_currency(pos.valor_maior_acumulo),
                        text(&pos.razao_social),
                        fmt_currency(pos.valor_debito_atual),
                        fmt_currency(pos.valor_limite_credito)
                    );
                }
            }
        }

        Self::section("Monthly queries");
        if record.consultas_mensais.is_empty() {
            Self::none_recorded();
        } else {
            for c in record.consultas_mensais.iter().take(MAX_ROWS) {
                println!(
                    "  {:<12} {:>8}",
                    text(&c.mes_ano),
                    fmt_count(c.quantidade_consultas)
                );
            }
        }

        Self::section("Peers that queried");
        if record.associadas_consultaram.is_empty() {
            Self::none_recorded();
        } else {
            for a in record.associadas_consultaram.iter().take(MAX_ROWS) {
                println!("  {}", text(&a.razao_social));
            }
        }

        Self::section("Peers that declined credit");
        if record.associadas_nao_concederam.is_empty() {
            Self::none_recorded();
        } else {
            for a in record.associadas_nao_concederam.iter().take(MAX_ROWS) {
                println!("  {}", text(&a.razao_social));
            }
        }

        Self::section("Rating history");
        if record.ratings.is_empty() {
            Self::none_recorded();
        } else {
            for r in record.ratings.iter().take(MAX_ROWS) {
                println!(
                    "  {:<12} {:<8} {}",
                    fmt_day(&r.data),
                    text(&r.classificacao),
                    text(&r.descricao_classificacao)
                );
            }
        }

        Self::section("Counters");
        Self::field(
            "Bounced checks",
            &fmt_count(record.extras.tot_cheques_sem_fundo),
        );
        Self::field(
            "Protested titles",
            &fmt_count(record.extras.tot_titulos_protesto),
        );
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, record: &LookupRecord) {
        match record.principal.as_ref() {
            Some(principal) => {
                Self::render_principal(principal);
                Self::render_collections(record);
                println!();
            }
            None => self.show_empty(),
        }
    }

    fn show_empty(&mut self) {
        println!();
        println!(
            "{}",
            "No data loaded. Run a lookup for an 8-digit root or a full CNPJ.".dimmed()
        );
    }
}
