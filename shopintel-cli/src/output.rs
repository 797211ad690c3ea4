use nu_ansi_term::Color;

use shopintel::admin::AdminSnapshot;
use shopintel::models::{Insight, Severity, User};
use shopintel::terms::{TERMS_NOTICE, TERMS_SECTIONS};
use shopintel::workflow::WorkflowSnapshot;
use shopintel::{AnalysisReport, DashboardView, WorkflowPhase};

/// Boxed text table. Numeric cells are right-aligned.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Border, header, border, rows, border.
    fn lines(&self) -> Vec<String> {
        let widths = self.widths();
        let border = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );
        let line = |cells: Vec<String>| {
            let cells = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| {
                    if cell.parse::<f64>().is_ok() {
                        format!(" {cell:>width$} ")
                    } else {
                        format!(" {cell:<width$} ")
                    }
                })
                .collect::<Vec<_>>();
            format!("|{}|", cells.join("|"))
        };

        let mut lines = vec![border.clone()];
        lines.push(line(self.headers.iter().map(|h| h.to_string()).collect()));
        lines.push(border.clone());
        lines.extend(self.rows.iter().map(|row| line(row.clone())));
        lines.push(border);
        lines
    }

    pub fn print(&self) {
        for (idx, line) in self.lines().into_iter().enumerate() {
            if idx == 1 {
                println!("{}", Color::White.bold().paint(line));
            } else {
                println!("{}", line);
            }
        }
    }
}

fn heading(text: &str) {
    println!("\n{}", Color::Cyan.bold().paint(text));
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn print_terms() {
    heading("Terms & Conditions");
    println!("{} {}", Color::Red.bold().paint("Important:"), TERMS_NOTICE);
    for (idx, section) in TERMS_SECTIONS.iter().enumerate() {
        println!("\n{}. {}", idx + 1, Color::White.bold().paint(section.title));
        println!("   {}", section.content);
    }
}

pub fn print_greeting(user: &User) {
    println!("Welcome back, {}", Color::Cyan.paint(user.display_name()));
}

pub fn print_analysis_report(report: &AnalysisReport) {
    if let Some(err) = &report.kpi_error {
        println!("{} KPI analysis failed: {}", Color::Yellow.paint("warning:"), err);
    }
    if let Some(err) = &report.forecast_error {
        println!("{} forecast failed: {}", Color::Yellow.paint("warning:"), err);
    }
}

pub fn print_dashboard(snapshot: &WorkflowSnapshot) {
    let phase = match snapshot.phase {
        WorkflowPhase::Ready => Color::Green.paint(snapshot.phase.to_string()),
        WorkflowPhase::Error => Color::Red.paint(snapshot.phase.to_string()),
        _ => Color::Yellow.paint(snapshot.phase.to_string()),
    };
    println!("Status: {}", phase);
    if let Some(reason) = &snapshot.last_error {
        println!("{} {}", Color::Red.bold().paint("error:"), reason);
    }

    let tabs = DashboardView::ALL
        .iter()
        .map(|view| {
            if *view == snapshot.view {
                Color::Cyan.bold().paint(format!("[{}]", view.label())).to_string()
            } else {
                view.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", tabs);

    match snapshot.view {
        DashboardView::Overview => print_overview(snapshot),
        DashboardView::Analytics => print_kpis(snapshot),
        DashboardView::Forecast => print_forecast(snapshot),
        DashboardView::Insights => print_insights(snapshot.insights()),
    }
}

fn print_overview(snapshot: &WorkflowSnapshot) {
    heading("Dataset");
    match &snapshot.dataset {
        Some(dataset) => Table::new(&["File", "Rows", "Uploaded"])
            .with_rows([vec![
                dataset.filename.clone(),
                dataset.row_count.to_string(),
                dataset.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            ]])
            .print(),
        None => println!("No dataset uploaded."),
    }
    print_kpis(snapshot);
    if let Some(forecast) = snapshot.forecast() {
        println!(
            "\nForecast: {} periods, {} insights",
            forecast.periods,
            forecast.insights.len()
        );
    }
}

fn print_kpis(snapshot: &WorkflowSnapshot) {
    heading("Key Performance Indicators");
    match snapshot.kpis() {
        Some(kpis) if !kpis.is_empty() => {
            Table::new(&["Metric", "Value"])
                .with_rows(
                    kpis.iter()
                        .map(|(name, value)| vec![name.to_string(), number(value)]),
                )
                .print();
        }
        _ => println!("KPIs not available."),
    }
}

fn print_forecast(snapshot: &WorkflowSnapshot) {
    heading("Sales Forecast");
    let Some(forecast) = snapshot.forecast() else {
        println!("Forecast not available.");
        return;
    };
    println!(
        "Confidence interval: {:.0}%",
        forecast.series.confidence * 100.0
    );
    let optional = |value: Option<f64>| value.map(number).unwrap_or_else(|| "-".to_string());
    Table::new(&["Date", "Prediction", "Lower", "Upper"])
        .with_rows(forecast.series.points().into_iter().map(|point| {
            vec![
                point.date.to_string(),
                number(point.prediction),
                optional(point.lower),
                optional(point.upper),
            ]
        }))
        .print();
}

fn print_insights(insights: &[Insight]) {
    heading("Business Insights");
    if insights.is_empty() {
        println!("No insights available.");
        return;
    }
    for insight in insights {
        let color = match insight.severity {
            Severity::High => Color::Red,
            Severity::Medium => Color::Yellow,
            Severity::Low => Color::Green,
        };
        print!("- {} {}", color.paint(format!("[{}]", insight.severity)), insight.message);
        match &insight.action {
            Some(action) => println!(" (action: {})", action),
            None => println!(),
        }
    }
}

pub fn print_users(snapshot: &AdminSnapshot) {
    let rows = snapshot.users.iter().map(|user| {
        vec![
            user.id.to_string(),
            user.username.clone(),
            user.full_name.clone().unwrap_or_default(),
            user.company_name.clone().unwrap_or_default(),
            if user.is_active { "active" } else { "inactive" }.to_string(),
            user.last_login
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "Never".to_string()),
        ]
    });
    Table::new(&["ID", "Username", "Name", "Company", "Status", "Last login"])
        .with_rows(rows)
        .print();
}

pub fn print_stats(snapshot: &AdminSnapshot) {
    let stats = &snapshot.stats;
    Table::new(&["Active users", "Datasets processed", "API requests", "Storage used"])
        .with_rows([vec![
            stats.active_users.to_string(),
            stats.datasets_processed.to_string(),
            stats.api_requests.to_string(),
            stats.storage_label(),
        ]])
        .print();
}

pub fn print_health(snapshot: &AdminSnapshot) {
    let health = &snapshot.health;
    let status = if health.is_healthy() {
        Color::Green.paint(&health.status)
    } else {
        Color::Red.paint(&health.status)
    };
    println!("System status: {}", status);
    let table = Table::new(&["Component", "Status"]).with_rows(health.details.iter().map(
        |(name, value)| {
            let value = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            vec![name.clone(), value]
        },
    ));
    if !table.is_empty() {
        table.print();
    }
}
