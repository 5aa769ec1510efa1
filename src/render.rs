//! Text rendering of the views. Tables are ratatui widgets drawn off screen
//! into a [`Buffer`] and printed line by line.

use crate::domain::models::container::{ContainerStatus, ContainerSummary, ImageEntry, PortMap, web_links};
use crate::domain::models::user::UserRow;
use crate::domain::ports::ProvisioningApi;
use crate::views::admin::{AdminDashboard, Tab};
use crate::views::user::{UserAction, UserDashboard};
use colored::{ColoredString, Colorize};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Row, Table, Widget};
use std::fmt::{Display, Formatter, Write};

const COLUMN_SPACING: u16 = 2;

/// A widget drawn into an off-screen buffer.
///
/// [`Display`] prints it with colours (when `colored` decides the terminal
/// supports them), [`Panel::plain`] without.
#[derive(Debug, Clone)]
pub struct Panel {
    buffer: Buffer,
}

impl Panel {
    fn draw(widget: impl Widget, width: u16, height: u16) -> Self {
        let mut buffer = Buffer::empty(Rect::new(0, 0, width, height));
        widget.render(buffer.area, &mut buffer);
        Self { buffer }
    }

    fn message(text: &'static str) -> Self {
        let width = Line::from(text).width() as u16;
        Self::draw(Paragraph::new(text), width, 1)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn plain(&self) -> String {
        self.lines(false)
    }

    pub fn styled(&self) -> String {
        self.lines(true)
    }

    fn lines(&self, styled: bool) -> String {
        let area = self.buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            // trailing blanks are dropped
            let end = (area.left()..area.right())
                .rev()
                .find(|&x| self.buffer[(x, y)].symbol() != " ")
                .map_or(area.left(), |x| x + 1);

            let mut run = String::new();
            let mut run_style = Style::default();
            for x in area.left()..end {
                let cell = &self.buffer[(x, y)];
                let style = cell.style();
                if style != run_style {
                    push_run(&mut out, &run, run_style, styled);
                    run.clear();
                    run_style = style;
                }
                run.push_str(cell.symbol());
            }
            push_run(&mut out, &run, run_style, styled);
            out.push('\n');
        }
        out
    }
}

impl Display for Panel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.styled())
    }
}

fn push_run(out: &mut String, run: &str, style: Style, styled: bool) {
    if run.is_empty() {
        return;
    }
    if !styled {
        out.push_str(run);
        return;
    }
    let mut painted: ColoredString = match style.fg {
        Some(Color::Green) => run.green(),
        Some(Color::Red) => run.red(),
        Some(Color::Yellow) => run.yellow(),
        _ => run.normal(),
    };
    if style.add_modifier.contains(Modifier::BOLD) {
        painted = painted.bold();
    }
    _ = write!(out, "{painted}");
}

/// Lays `rows` out below a bold `header`, each column as wide as its
/// widest cell.
fn grid<const N: usize>(header: [&'static str; N], rows: Vec<[Text<'static>; N]>) -> Panel {
    let mut widths = header.map(|h| Line::from(h).width() as u16);
    for row in &rows {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.width() as u16);
        }
    }
    let heights: Vec<u16> = rows
        .iter()
        .map(|row| row.iter().map(Text::height).max().unwrap_or(1).max(1) as u16)
        .collect();

    let width = widths.iter().sum::<u16>() + COLUMN_SPACING * (N as u16).saturating_sub(1);
    let height = 1 + heights.iter().sum::<u16>();
    let rows = rows
        .into_iter()
        .zip(heights)
        .map(|(cells, height)| Row::new(cells).height(height));
    let table = Table::new(rows, widths.map(Constraint::Length))
        .header(Row::new(header).style(Style::new().add_modifier(Modifier::BOLD)))
        .column_spacing(COLUMN_SPACING);
    Panel::draw(table, width, height)
}

/// Badge colour of a container status.
pub fn status_color(status: &ContainerStatus) -> Color {
    match status {
        ContainerStatus::Running => Color::Green,
        ContainerStatus::Exited => Color::Red,
        ContainerStatus::Other(_) => Color::Yellow,
    }
}

fn port_lines(ports: &PortMap) -> String {
    if ports.is_empty() {
        return "No ports mapped".to_string();
    }
    ports
        .iter()
        .map(|(container_port, host_port)| format!("{container_port} → {host_port}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user's container panel, including "Open" links for web ports.
pub fn container_status<A: ProvisioningApi>(view: &UserDashboard<A>, hostname: &str) -> String {
    let mut out = String::new();
    let client = view.client_id().trim();
    if client.is_empty() {
        _ = writeln!(out, "Enter a client ID");
        return out;
    }
    if !view.is_authorized() {
        _ = writeln!(out, "Client {client} is not authorized");
        return out;
    }
    let Some(container_id) = view.container_id() else {
        _ = writeln!(out, "No container for client {client}");
        return out;
    };

    _ = writeln!(out, "Container ID: {container_id}");
    if view.ports().is_empty() {
        _ = writeln!(out, "No ports mapped");
    } else {
        _ = writeln!(out, "Ports:");
        let links = web_links(view.ports(), hostname);
        for (container_port, host_port) in view.ports() {
            match links.iter().find(|l| &l.container_port == container_port) {
                Some(link) => {
                    _ = writeln!(out, "  {container_port} → {host_port}  Open: {}", link.url);
                }
                None => {
                    _ = writeln!(out, "  {container_port} → {host_port}");
                }
            }
        }
    }
    if let Some(host_ip) = view.host_ip() {
        _ = writeln!(out, "Host IP: {host_ip}");
    }
    if let Some(note) = view.note() {
        _ = writeln!(out, "Note: {note}");
    }
    out
}

/// Which of the user's buttons are usable.
pub fn user_actions<A: ProvisioningApi>(view: &UserDashboard<A>) -> String {
    [UserAction::Spawn, UserAction::Restart, UserAction::Destroy]
        .iter()
        .map(|action| {
            if view.is_enabled(*action) {
                format!("[{action}]")
            } else {
                format!("({action} disabled)")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn container_table(containers: &[ContainerSummary], loading: bool) -> Panel {
    if loading {
        return Panel::message("Loading containers...");
    }
    if containers.is_empty() {
        return Panel::message("No containers found");
    }
    let rows = containers
        .iter()
        .map(|c| {
            let status = Span::styled(
                c.status.to_string(),
                Style::new().fg(status_color(&c.status)),
            );
            let actions = c
                .status
                .allowed_actions()
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            [
                Text::raw(c.client_id.as_str().to_string()),
                Text::raw(c.image.clone()),
                Text::from(status),
                Text::raw(c.short_id().to_string()),
                Text::raw(port_lines(&c.ports)),
                Text::raw(actions),
            ]
        })
        .collect();
    grid(
        ["Client ID", "Image", "Status", "Container ID", "Ports", "Actions"],
        rows,
    )
}

pub fn user_table(rows: &[UserRow]) -> Panel {
    let rows = rows
        .iter()
        .map(|row| {
            [
                Text::raw(row.username.clone()),
                Text::raw(row.role.to_string()),
                Text::raw(if row.deletable { "delete" } else { "" }),
            ]
        })
        .collect();
    grid(["Username", "Role", "Actions"], rows)
}

pub fn image_matches(entries: &[ImageEntry]) -> Panel {
    if entries.is_empty() {
        return Panel::message("No matching images");
    }
    let rows = entries
        .iter()
        .map(|e| [Text::raw(e.image.clone()), Text::raw(e.label.clone())])
        .collect();
    grid(["Image", "Label"], rows)
}

/// The tab of the admin dashboard that is currently active.
pub fn dashboard<A: ProvisioningApi>(view: &AdminDashboard<A>) -> Panel {
    match view.active_tab() {
        Tab::Containers => container_table(view.containers(), view.is_loading()),
        Tab::Users => user_table(&view.user_rows()),
    }
}
