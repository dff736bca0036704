//! HTML listing of upcoming events.

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Url;

use crate::event::EventRecord;

/// Number of upcoming events shown before the "show more" section.
pub const VISIBLE_EVENTS: usize = 3;

/// Whether the event starts after `now`. Events without a usable date or start time
/// never count as upcoming.
pub fn is_upcoming(event: &EventRecord, now: NaiveDateTime) -> bool {
    event.start().is_ok_and(|start| start > now)
}

pub fn upcoming(events: &[EventRecord], now: NaiveDateTime) -> Vec<&EventRecord> {
    events
        .iter()
        .filter(|event| is_upcoming(event, now))
        .collect()
}

/// Upcoming events split into the initially visible prefix and the collapsed rest.
#[derive(Debug, PartialEq, Eq)]
pub struct Agenda<'a> {
    pub visible: Vec<&'a EventRecord>,
    pub remaining: Vec<&'a EventRecord>,
}

impl<'a> Agenda<'a> {
    pub fn new(events: &'a [EventRecord], now: NaiveDateTime) -> Self {
        let mut visible = upcoming(events, now);
        let remaining = visible.split_off(VISIBLE_EVENTS.min(visible.len()));
        Self { visible, remaining }
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

/// Long English form, e.g. `Sunday, December 15, 2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Subscription link understood by Apple Calendar.
pub fn webcal_url(feed_url: &str) -> String {
    let rest = feed_url
        .strip_prefix("https://")
        .or_else(|| feed_url.strip_prefix("http://"))
        .unwrap_or(feed_url);
    format!("webcal://{rest}")
}

/// Google Calendar's "add by URL" link for the feed.
pub fn google_subscribe_url(feed_url: &str) -> Option<String> {
    Url::parse_with_params(
        "https://calendar.google.com/calendar/r",
        &[("cid", webcal_url(feed_url))],
    )
    .ok()
    .map(String::from)
}

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn render_card(html: &mut String, event: &EventRecord) -> std::fmt::Result {
    let date = event
        .date()
        .map(display_date)
        .unwrap_or_else(|_| event.date.clone().unwrap_or_default());
    let time = event
        .schedule
        .as_ref()
        .map(|schedule| schedule.start())
        .unwrap_or_default();

    writeln!(html, r#"<div class="event-card">"#)?;
    writeln!(
        html,
        r#"<div class="event-date">{} at {}</div>"#,
        escape_html(&date),
        escape_html(time)
    )?;
    writeln!(
        html,
        r#"<h3 class="event-title">{}</h3>"#,
        escape_html(event.title.as_deref().unwrap_or_default())
    )?;
    if let Some(location) = &event.location {
        writeln!(
            html,
            r#"<div class="event-location">{}</div>"#,
            escape_html(location)
        )?;
    }
    writeln!(html, "</div>")
}

fn render_events(html: &mut String, agenda: &Agenda<'_>) -> std::fmt::Result {
    if agenda.is_empty() {
        writeln!(html, r#"<div class="no-events">"#)?;
        writeln!(html, "<h3>No upcoming events</h3>")?;
        writeln!(html, "<p>Check back soon for new events!</p>")?;
        return writeln!(html, "</div>");
    }

    writeln!(html, r#"<div class="visible-events events-grid">"#)?;
    for event in &agenda.visible {
        render_card(html, event)?;
    }
    writeln!(html, "</div>")?;

    if !agenda.remaining.is_empty() {
        writeln!(html, r#"<details class="hidden-events">"#)?;
        writeln!(
            html,
            r#"<summary class="toggle-events-btn">Show {} More Events</summary>"#,
            agenda.remaining.len()
        )?;
        writeln!(html, r#"<div class="events-grid">"#)?;
        for event in &agenda.remaining {
            render_card(html, event)?;
        }
        writeln!(html, "</div>")?;
        writeln!(html, "</details>")?;
    }

    Ok(())
}

fn render_subscribe(html: &mut String, feed_url: &str) -> std::fmt::Result {
    writeln!(html, r#"<section id="subscribe">"#)?;
    writeln!(html, "<h2>Subscribe</h2>")?;
    writeln!(
        html,
        r#"<input id="ical-url" type="text" readonly value="{}">"#,
        escape_html(feed_url)
    )?;
    writeln!(
        html,
        r#"<a class="btn-apple" href="{}">Apple Calendar</a>"#,
        escape_html(&webcal_url(feed_url))
    )?;
    if let Some(google) = google_subscribe_url(feed_url) {
        writeln!(
            html,
            r#"<a class="btn-google" href="{}">Google Calendar</a>"#,
            escape_html(&google)
        )?;
    }
    writeln!(
        html,
        "<p>To add the feed by hand, choose \"From URL\" under \"Other calendars\" and paste the address above.</p>"
    )?;
    writeln!(html, "</section>")
}

fn render_document(html: &mut String, agenda: &Agenda<'_>, feed_url: &str) -> std::fmt::Result {
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, r#"<html lang="en">"#)?;
    writeln!(html, r#"<head><meta charset="utf-8"><title>Events</title></head>"#)?;
    writeln!(html, "<body>")?;
    writeln!(html, r#"<section id="events">"#)?;
    writeln!(html, "<h2>Upcoming Events</h2>")?;
    writeln!(html, r#"<div id="events-container">"#)?;
    render_events(html, agenda)?;
    writeln!(html, "</div>")?;
    writeln!(html, "</section>")?;
    render_subscribe(html, feed_url)?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")
}

/// Renders the full listing page for `events` as seen at `now`.
pub fn render_page(events: &[EventRecord], now: NaiveDateTime, feed_url: &str) -> String {
    let agenda = Agenda::new(events, now);
    let mut html = String::new();
    render_document(&mut html, &agenda, feed_url).expect("writing to a String cannot fail");
    html
}
