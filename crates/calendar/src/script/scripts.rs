//! AppleScript source generation for Calendar.app.
//!
//! Every user-supplied string goes through [`escape_applescript`] before it
//! is spliced into a string literal. Dates are assigned component by
//! component so the scripts do not depend on the user's locale.

use chrono::{DateTime, Datelike, Local, Timelike, Utc};

use crate::event::{DateRange, NewEvent};

use super::wire::{FIELD_SEPARATOR_ID, NOT_FOUND_MARKER, RECORD_SEPARATOR_ID};

/// Script used to check (and, the first time, prompt for) automation access.
pub(crate) const ACCESS_CHECK: &str = r#"tell application "Calendar" to count calendars"#;

/// Escape a value for use inside an AppleScript string literal.
///
/// Only backslash and double quote are special inside AppleScript literals.
pub fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Helpers shared by the read script: zero padding, ISO rendering and the
/// `=`-prefix encoding of optional values.
const HANDLERS: &str = r#"on pad(n)
	if n < 10 then return "0" & (n as text)
	return n as text
end pad

on isoDate(d)
	set t to time of d
	return ((year of d) as text) & "-" & pad((month of d) as integer) & "-" & pad(day of d) & "T" & pad(t div 3600) & ":" & pad((t mod 3600) div 60) & ":" & pad(t mod 60)
end isoDate

on plainText(v)
	if v is missing value then return ""
	return v as text
end plainText

on optionalText(v)
	if v is missing value then return ""
	return "=" & (v as text)
end optionalText
"#;

/// Statements assigning `instant` (in local time) to the AppleScript variable `var`.
///
/// The day is reset to 1 first so that setting year/month never overflows
/// (e.g. Jan 31 -> Feb).
fn date_assignment(var: &str, instant: DateTime<Utc>) -> String {
    let local = instant.with_timezone(&Local);
    format!(
        "set {var} to current date\n\
         set day of {var} to 1\n\
         set year of {var} to {year}\n\
         set month of {var} to {month}\n\
         set day of {var} to {day}\n\
         set time of {var} to {seconds}\n",
        year = local.year(),
        month = local.month(),
        day = local.day(),
        seconds = local.num_seconds_from_midnight(),
    )
}

/// List every event across all calendars whose start lies in `range`.
pub(crate) fn events_between(range: &DateRange) -> String {
    let mut script = String::from(HANDLERS);
    script.push('\n');
    script.push_str(&format!(
        "set fieldSep to character id {FIELD_SEPARATOR_ID}\n\
         set recordSep to character id {RECORD_SEPARATOR_ID}\n"
    ));
    script.push_str(&date_assignment("fromDate", range.from));
    script.push_str(&date_assignment("toDate", range.to));
    script.push_str(
        r#"set output to ""
tell application "Calendar"
	repeat with cal in calendars
		set calName to name of cal
		set matches to (every event of cal whose start date is greater than or equal to fromDate and start date is less than or equal to toDate)
		repeat with ev in matches
			set output to output & (uid of ev) & fieldSep & my plainText(summary of ev) & fieldSep & my optionalText(location of ev) & fieldSep & my optionalText(description of ev) & fieldSep & my optionalText(url of ev) & fieldSep & my isoDate(start date of ev) & fieldSep & my isoDate(end date of ev) & fieldSep & calName & fieldSep & ((allday event of ev) as text) & recordSep
		end repeat
	end repeat
end tell
return output
"#,
    );
    script
}

/// Create `event`, returning the new event's uid on stdout.
///
/// Calendar resolution: the requested calendar, then `default_calendar`,
/// then the first writable calendar.
pub(crate) fn create_event(event: &NewEvent, default_calendar: Option<&str>) -> String {
    let mut script = String::new();
    script.push_str(&date_assignment("startDate", event.start));
    script.push_str(&date_assignment("endDate", event.end));
    script.push_str("tell application \"Calendar\"\n\tset targetCal to missing value\n");

    for name in [event.calendar_name.as_deref(), default_calendar]
        .into_iter()
        .flatten()
    {
        let name = escape_applescript(name);
        script.push_str(&format!(
            "\tif targetCal is missing value and (exists calendar \"{name}\") then set targetCal to calendar \"{name}\"\n"
        ));
    }

    script.push_str(
        "\tif targetCal is missing value then set targetCal to first calendar whose writable is true\n",
    );
    script.push_str(&format!(
        "\tset newEvent to make new event at end of events of targetCal with properties {{summary:\"{title}\", start date:startDate, end date:endDate, allday event:{all_day}}}\n",
        title = escape_applescript(&event.title),
        all_day = event.is_all_day,
    ));
    if let Some(location) = &event.location {
        script.push_str(&format!(
            "\tset location of newEvent to \"{}\"\n",
            escape_applescript(location)
        ));
    }
    if let Some(notes) = &event.notes {
        script.push_str(&format!(
            "\tset description of newEvent to \"{}\"\n",
            escape_applescript(notes)
        ));
    }
    script.push_str("\treturn uid of newEvent\nend tell\n");
    script
}

/// Reveal the event with `event_id` in Calendar.app.
pub(crate) fn open_event(event_id: &str) -> String {
    format!(
        r#"tell application "Calendar"
	repeat with cal in calendars
		set matches to (every event of cal whose uid is "{id}")
		if (count of matches) > 0 then
			show item 1 of matches
			activate
			return "OPENED"
		end if
	end repeat
end tell
return "{NOT_FOUND_MARKER}"
"#,
        id = escape_applescript(event_id),
    )
}
