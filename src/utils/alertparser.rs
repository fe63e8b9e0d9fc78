use std::collections::HashMap;
use std::convert::TryFrom;
use std::default::Default;
use yaserde::de::from_str;
use yaserde_derive::{YaDeserialize, YaSerialize};

use crate::error::Error;

// Low-level XML parsing structs (these match the vendor payload)

#[derive(Debug, YaSerialize, YaDeserialize, Default)]
#[yaserde(rename = "EventNotificationAlert")]
pub struct EventNotificationAlert {
    #[yaserde(rename = "ipAddress")]
    pub ip_address: Option<String>,

    #[yaserde(rename = "macAddress")]
    pub mac_address: Option<String>,

    #[yaserde(rename = "channelID")]
    pub channel_id: Option<String>,

    #[yaserde(rename = "channelName")]
    pub channel_name: Option<String>,

    #[yaserde(rename = "dateTime")]
    pub date_time: Option<String>,

    #[yaserde(rename = "eventType")]
    pub event_type: Option<String>,

    #[yaserde(rename = "eventState")]
    pub event_state: Option<String>,

    #[yaserde(rename = "eventDescription")]
    pub event_description: Option<String>,

    #[yaserde(rename = "activePostCount")]
    pub active_post_count: Option<String>,

    #[yaserde(rename = "portNo")]
    pub port_no: Option<String>,

    #[yaserde(rename = "protocolType")]
    pub protocol_type: Option<String>,

    #[yaserde(rename = "peopleCounting")]
    pub people_counting: Option<PeopleCounting>,
}

#[derive(Debug, YaSerialize, YaDeserialize, Default)]
pub struct PeopleCounting {
    #[yaserde(rename = "statisticalMethods")]
    pub statistical_methods: Option<String>,

    #[yaserde(rename = "enter")]
    pub enter: Option<String>,

    #[yaserde(rename = "exit")]
    pub exit: Option<String>,

    #[yaserde(rename = "countingSceneMode")]
    pub counting_scene_mode: Option<String>,
}

// High-level API structs
// ======================

/// A validated people-counting notification, ready to be stored.
#[derive(Debug, Clone)]
pub struct CameraNotification {
    pub ip_address: String,
    pub mac_address: String,
    pub channel_id: String,
    pub channel_name: String,
    pub event_type: String,
    pub event_state: String,
    pub date_time: String,
    pub enter: i64,
    pub exit: i64,
    pub counting_scene_mode: String,
    /// Vendor fields the record does not model, kept verbatim.
    pub extra: HashMap<String, String>,
}

fn required(value: &Option<String>) -> Result<String, Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::Validation("Missing required fields".to_string())),
    }
}

fn required_count(value: &Option<String>, name: &str) -> Result<i64, Error> {
    let raw = required(value)?;
    raw.parse::<i64>()
        .map_err(|_| Error::Validation(format!("Invalid {} count: {}", name, raw)))
}

impl TryFrom<EventNotificationAlert> for CameraNotification {
    type Error = Error;

    fn try_from(alert: EventNotificationAlert) -> Result<Self, Self::Error> {
        let counting = alert
            .people_counting
            .as_ref()
            .ok_or_else(|| Error::Validation("Missing required fields".to_string()))?;

        let mut extra = HashMap::new();
        let optional = [
            ("eventDescription", &alert.event_description),
            ("activePostCount", &alert.active_post_count),
            ("portNo", &alert.port_no),
            ("protocolType", &alert.protocol_type),
            ("statisticalMethods", &counting.statistical_methods),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                let v = v.trim();
                if !v.is_empty() {
                    extra.insert(name.to_string(), v.to_string());
                }
            }
        }

        Ok(CameraNotification {
            ip_address: required(&alert.ip_address)?,
            mac_address: required(&alert.mac_address)?,
            channel_id: required(&alert.channel_id)?,
            channel_name: required(&alert.channel_name)?,
            event_type: required(&alert.event_type)?,
            event_state: required(&alert.event_state)?,
            date_time: required(&alert.date_time)?,
            enter: required_count(&counting.enter, "enter")?,
            exit: required_count(&counting.exit, "exit")?,
            counting_scene_mode: required(&counting.counting_scene_mode)?,
            extra,
        })
    }
}

// Helper functions for parsing notifications
// ==========================================

/// Parse notification XML and return the low-level representation
pub fn parse_raw_notification(xml: &str) -> Result<EventNotificationAlert, Error> {
    from_str(xml).map_err(|e| Error::Parse(format!("Failed to parse event notification: {}", e)))
}

/// Parse notification XML and return the validated high-level representation
pub fn parse_notification(xml: &str) -> Result<CameraNotification, Error> {
    let alert = parse_raw_notification(xml)?;
    CameraNotification::try_from(alert)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <EventNotificationAlert>
            <ipAddress>192.168.1.64</ipAddress>
            <portNo>80</portNo>
            <protocolType>HTTP</protocolType>
            <macAddress>c0:56:e3:d2:11:9a</macAddress>
            <channelID>1</channelID>
            <channelName>Entrance</channelName>
            <dateTime>2024-01-01T10:00:00+0700</dateTime>
            <activePostCount>1</activePostCount>
            <eventType>PeopleCounting</eventType>
            <eventState>active</eventState>
            <eventDescription>peopleCounting alarm</eventDescription>
            <peopleCounting>
                <statisticalMethods>realTime</statisticalMethods>
                <enter>3</enter>
                <exit>1</exit>
                <countingSceneMode>indoor</countingSceneMode>
            </peopleCounting>
        </EventNotificationAlert>"#
    }

    #[test]
    fn parses_complete_notification() {
        let event = parse_notification(sample_alert()).unwrap();

        assert_eq!(event.ip_address, "192.168.1.64");
        assert_eq!(event.mac_address, "c0:56:e3:d2:11:9a");
        assert_eq!(event.channel_id, "1");
        assert_eq!(event.channel_name, "Entrance");
        assert_eq!(event.date_time, "2024-01-01T10:00:00+0700");
        assert_eq!(event.event_type, "PeopleCounting");
        assert_eq!(event.event_state, "active");
        assert_eq!(event.enter, 3);
        assert_eq!(event.exit, 1);
        assert_eq!(event.counting_scene_mode, "indoor");

        assert_eq!(
            event.extra.get("eventDescription").map(String::as_str),
            Some("peopleCounting alarm")
        );
        assert_eq!(
            event.extra.get("statisticalMethods").map(String::as_str),
            Some("realTime")
        );
    }

    #[test]
    fn missing_top_level_field_is_rejected() {
        let xml = sample_alert().replace("<macAddress>c0:56:e3:d2:11:9a</macAddress>", "");
        let err = parse_notification(&xml).unwrap_err();

        match err {
            Error::Validation(msg) => assert_eq!(msg, "Missing required fields"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn missing_nested_count_is_rejected() {
        let xml = sample_alert().replace("<exit>1</exit>", "");
        let err = parse_notification(&xml).unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn missing_counting_group_is_rejected() {
        let start = sample_alert().find("<peopleCounting>").unwrap();
        let end = sample_alert().find("</peopleCounting>").unwrap() + "</peopleCounting>".len();
        let mut xml = sample_alert().to_string();
        xml.replace_range(start..end, "");

        let err = parse_notification(&xml).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn empty_element_counts_as_missing() {
        let xml = sample_alert().replace(
            "<channelName>Entrance</channelName>",
            "<channelName></channelName>",
        );
        let err = parse_notification(&xml).unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn non_integer_count_is_rejected() {
        let xml = sample_alert().replace("<enter>3</enter>", "<enter>three</enter>");
        let err = parse_notification(&xml).unwrap_err();

        match err {
            Error::Validation(msg) => assert!(msg.contains("enter")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        let err = parse_notification("<EventNotificationAlert><ipAddress>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn foreign_root_is_rejected() {
        let xml = r#"<SomethingElse><ipAddress>10.0.0.5</ipAddress></SomethingElse>"#;
        assert!(parse_notification(xml).is_err());
    }
}
