use crate::types::Workout;
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::Path;

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";

/// Render workouts as GPX 1.1 waypoints, one `<wpt>` per workout in list order.
pub fn to_gpx(workouts: &[Workout]) -> Result<String> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("version", "1.1"),
        ("creator", "pinlog"),
        ("xmlns", GPX_NS),
    ])))?;

    for w in workouts {
        write_waypoint(&mut xml, w)?;
    }

    xml.write_event(Event::End(BytesEnd::new("gpx")))?;

    String::from_utf8(xml.into_inner()).context("GPX output is not UTF-8")
}

fn write_waypoint(xml: &mut Writer<Vec<u8>>, w: &Workout) -> Result<()> {
    let c = w.coords();
    let lat = c.lat.to_string();
    let lon = c.lng.to_string();
    let time = w.created_at().to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut wpt = BytesStart::new("wpt");
    wpt.push_attribute(("lat", lat.as_str()));
    wpt.push_attribute(("lon", lon.as_str()));
    xml.write_event(Event::Start(wpt))?;

    text_element(xml, "time", &time)?;
    text_element(xml, "name", w.description())?;
    text_element(xml, "desc", &w.label())?;
    text_element(xml, "type", w.workout_type().as_str())?;

    xml.write_event(Event::End(BytesEnd::new("wpt")))?;
    Ok(())
}

fn text_element(xml: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn export_gpx(workouts: &[Workout], path: &Path) -> Result<usize> {
    let gpx = to_gpx(workouts)?;
    fs::write(path, gpx).with_context(|| format!("writing GPX: {}", path.display()))?;
    tracing::info!(path = %path.display(), waypoints = workouts.len(), "gpx exported");
    Ok(workouts.len())
}
