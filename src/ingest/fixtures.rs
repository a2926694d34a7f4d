/// Test fixtures: representative payloads from every upstream feed, plus
/// a canned [`TextFetcher`] that serves them.
///
/// Payloads are structurally complete but truncated to what the parsers
/// read. Storm details follow the late-September 2025 Atlantic pattern:
/// Imelda (AL09) as a tropical storm over the northwestern Bahamas and
/// Humberto (AL08) as a major hurricane well east of them.

use std::cell::RefCell;
use std::time::Duration;

use crate::ingest::http::{FetchedDocument, TextFetcher};
use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Canned fetcher
// ---------------------------------------------------------------------------

/// Serves documents by URL substring and records every request.
///
/// Routes are checked in insertion order; the first route whose pattern
/// appears in the URL wins. Unrouted URLs answer 404. A route registered
/// with [`CannedFetcher::fail`] raises a transport error instead.
#[derive(Default)]
pub(crate) struct CannedFetcher {
    routes: Vec<(String, Option<FetchedDocument>)>,
    calls: RefCell<Vec<(String, Duration)>>,
}

impl CannedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(mut self, pattern: &str, body: &str) -> Self {
        self.routes.push((
            pattern.to_string(),
            Some(FetchedDocument { status: 200, body: body.to_string() }),
        ));
        self
    }

    pub(crate) fn status(mut self, pattern: &str, status: u16) -> Self {
        self.routes.push((
            pattern.to_string(),
            Some(FetchedDocument { status, body: String::new() }),
        ));
        self
    }

    pub(crate) fn fail(mut self, pattern: &str) -> Self {
        self.routes.push((pattern.to_string(), None));
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub(crate) fn calls_matching(&self, pattern: &str) -> usize {
        self.calls.borrow().iter().filter(|(url, _)| url.contains(pattern)).count()
    }

    pub(crate) fn timeouts_for(&self, pattern: &str) -> Vec<Duration> {
        self.calls
            .borrow()
            .iter()
            .filter(|(url, _)| url.contains(pattern))
            .map(|(_, t)| *t)
            .collect()
    }
}

impl TextFetcher for CannedFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedDocument, FetchError> {
        self.calls.borrow_mut().push((url.to_string(), timeout));

        match self.routes.iter().find(|(pattern, _)| url.contains(pattern.as_str())) {
            Some((_, Some(doc))) => Ok(doc.clone()),
            Some((_, None)) => Err(FetchError::NoData(format!("simulated network failure for {}", url))),
            None => Ok(FetchedDocument { status: 404, body: String::new() }),
        }
    }
}

// ---------------------------------------------------------------------------
// NHC map server (feeds A and D)
// ---------------------------------------------------------------------------

/// AT4 slot cone layer: Imelda's five-day cone over the northwestern
/// Bahamas. Storm id given in full ATCF form, wind numeric.
pub(crate) fn fixture_storm_page_cone_geojson() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "id": 1,
          "properties": {
            "STORMNAME": "Imelda",
            "STORMTYPE": "TS",
            "ADVISNUM": "8A",
            "STORMID": "al092025",
            "BASIN": "al",
            "STORMNUM": 9,
            "MAXWIND": 45,
            "FCSTPRD": 120
          },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[
              [-78.5, 24.0], [-75.5, 24.0], [-74.0, 28.0],
              [-76.0, 31.0], [-79.0, 28.0], [-78.5, 24.0]
            ]]
          }
        }
      ]
    }"#
}

/// An inactive slot: valid response, no features.
pub(crate) fn fixture_empty_layer_geojson() -> &'static str {
    r#"{ "type": "FeatureCollection", "features": [] }"#
}

/// Fallback layer: a duplicate of Humberto's cone identified only by
/// basin + number, plus an outlook development area with no id.
pub(crate) fn fixture_fallback_geojson() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {
            "stormname": "Humberto",
            "stormtype": "HU",
            "advisnum": "15",
            "basin": "AL",
            "stormnum": 8,
            "maxwind": "125"
          },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[
              [-62.0, 22.0], [-57.0, 22.0], [-58.0, 32.0],
              [-66.0, 32.0], [-62.0, 22.0]
            ]]
          }
        },
        {
          "type": "Feature",
          "properties": {
            "name": "Development Area 1",
            "type": "Area of Possible Development",
            "prob7day": "40%"
          },
          "geometry": {
            "type": "MultiPolygon",
            "coordinates": [[[
              [-50.0, 10.0], [-40.0, 10.0], [-40.0, 18.0],
              [-50.0, 18.0], [-50.0, 10.0]
            ]]]
          }
        }
      ]
    }"#
}

/// ArcGIS reports query failures as a 200 with an error envelope.
pub(crate) fn fixture_arcgis_error_json() -> &'static str {
    r#"{ "error": { "code": 400, "message": "Invalid or missing input parameters.", "details": [] } }"#
}

// ---------------------------------------------------------------------------
// CurrentStorms.json (feed B)
// ---------------------------------------------------------------------------

/// Two active storms. `intensity` is a string in knots, `movementSpeed`
/// is in mph, `movementDir` in degrees.
pub(crate) fn fixture_current_storms_json() -> &'static str {
    r#"{
      "activeStorms": [
        {
          "id": "al092025",
          "binNumber": "AT4",
          "name": "Imelda",
          "classification": "TS",
          "intensity": "45",
          "pressure": "1004",
          "latitude": "26.1N",
          "longitude": "77.2W",
          "latitudeNumeric": 26.1,
          "longitudeNumeric": -77.2,
          "movementDir": 0,
          "movementSpeed": 7,
          "lastUpdate": "2025-09-28T21:00:00.000Z",
          "publicAdvisory": {
            "advNum": "8A",
            "issuance": "2025-09-28T23:50:00.000Z",
            "url": "https://www.nhc.noaa.gov/text/refresh/MIATCPAT4+shtml/282350.shtml"
          }
        },
        {
          "id": "al082025",
          "binNumber": "AT3",
          "name": "Humberto",
          "classification": "HU",
          "intensity": "125",
          "pressure": "945",
          "latitudeNumeric": 24.6,
          "longitudeNumeric": -62.3,
          "movementDir": 315,
          "movementSpeed": 9,
          "lastUpdate": "2025-09-28T21:00:00.000Z",
          "publicAdvisory": { "advNum": "15" }
        }
      ]
    }"#
}

/// Off-season response.
pub(crate) fn fixture_no_active_storms_json() -> &'static str {
    r#"{ "activeStorms": [] }"#
}

// ---------------------------------------------------------------------------
// ATCF best track (feed C)
// ---------------------------------------------------------------------------

/// Apache directory index of the best-track folder.
pub(crate) fn fixture_btk_listing_html() -> &'static str {
    r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html>
 <head><title>Index of /atcf/btk</title></head>
 <body>
<h1>Index of /atcf/btk</h1>
<pre><a href="?C=N;O=D">Name</a>                    <a href="?C=M;O=A">Last modified</a>      <a href="?C=S;O=A">Size</a>
<hr><a href="/atcf/">Parent Directory</a>                             -
<a href="bal082025.dat">bal082025.dat</a>           2025-09-28 21:05   12K
<a href="bal092025.dat">bal092025.dat</a>           2025-09-28 21:04  9.1K
<a href="bal902025.dat">bal902025.dat</a>           2025-09-02 09:12  2.0K
<a href="bal942025.dat">bal942025.dat</a>           2025-09-28 18:40  3.3K
<a href="bep952025.dat">bep952025.dat</a>           2025-09-28 18:22  1.1K
<hr></pre>
</body></html>
"#
}

/// Invest 94L: two six-hourly fixes, the last at 2025-09-28 18Z.
pub(crate) fn fixture_btk_al94() -> &'static str {
    "AL, 94, 2025092812,   , BEST,   0, 152N,  521W,  25, 1010, DB,   0,    ,    0,    0,    0,    0, 1012,  150,  60,  30,   0,   L,   0,    ,   0,   0,     INVEST, S,\n\
     AL, 94, 2025092818,   , BEST,   0, 156N,  534W,  30, 1009, DB,   0,    ,    0,    0,    0,    0, 1012,  150,  60,  30,   0,   L,   0,    ,   0,   0,     INVEST, S,\n"
}

/// Invest 90L: last fix weeks old, deactivated.
pub(crate) fn fixture_btk_al90_stale() -> &'static str {
    "AL, 90, 2025090206,   , BEST,   0, 118N,  245W,  20, 1011, LO,   0,    ,    0,    0,    0,    0, 1013,  200,  80,   0,   0,   L,   0,    ,   0,   0,     INVEST, S,\n"
}

// ---------------------------------------------------------------------------
// api.weather.gov alerts (primary alerts)
// ---------------------------------------------------------------------------

/// Active alerts for a South Florida point: one hurricane warning, one
/// tropical storm watch, and an unrelated rip current statement.
pub(crate) fn fixture_nws_alerts_json() -> &'static str {
    r#"{
      "@context": ["https://geojson.org/geojson-ld/geojson-context.jsonld"],
      "type": "FeatureCollection",
      "features": [
        {
          "id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.aaa",
          "type": "Feature",
          "geometry": null,
          "properties": {
            "event": "Hurricane Warning",
            "headline": "Hurricane Warning issued September 28 at 11:00AM EDT by NWS Miami FL",
            "description": "* LOCATIONS AFFECTED\n  - Miami Beach\n\n* WIND\n  - Hurricane Imelda is expected to bring hurricane conditions.",
            "severity": "Extreme",
            "urgency": "Expected",
            "certainty": "Likely"
          }
        },
        {
          "id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.bbb",
          "type": "Feature",
          "geometry": null,
          "properties": {
            "event": "Tropical Storm Watch",
            "headline": null,
            "description": "Tropical storm conditions are possible within the watch area.",
            "severity": "Moderate",
            "urgency": "Future"
          }
        },
        {
          "id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.ccc",
          "type": "Feature",
          "geometry": null,
          "properties": {
            "event": "Rip Current Statement",
            "headline": "Rip Current Statement issued September 28",
            "description": "Dangerous rip currents from swells generated by Humberto.",
            "severity": "Moderate",
            "urgency": "Expected"
          }
        }
      ],
      "title": "Current watches, warnings, and advisories"
    }"#
}

// ---------------------------------------------------------------------------
// NHC text products (secondary alerts)
// ---------------------------------------------------------------------------

/// Public advisory with a warning for the central Bahamas and a watch
/// for the northwestern Bahamas.
pub(crate) fn fixture_advisory_bahamas_split() -> &'static str {
    "000\n\
WTNT34 KNHC 271500\n\
TCPAT4\n\
\n\
BULLETIN\n\
Potential Tropical Cyclone Nine Advisory Number 3\n\
NWS National Hurricane Center Miami FL       AL092025\n\
1100 AM EDT Sat Sep 27 2025\n\
\n\
...DISTURBANCE EXPECTED TO BRING HEAVY RAINS TO PORTIONS OF THE BAHAMAS...\n\
\n\
SUMMARY OF WATCHES AND WARNINGS IN EFFECT:\n\
\n\
A Tropical Storm Warning is in effect for...\n\
* Central Bahamas\n\
\n\
A Tropical Storm Watch is in effect for...\n\
* Northwestern Bahamas excluding Andros Island\n\
\n\
A Tropical Storm Warning means that tropical storm conditions are\n\
expected somewhere within the warning area.\n\
\n\
A Tropical Storm Watch means that tropical storm conditions are\n\
possible within the watch area.\n"
}

/// Public advisory naming New Providence explicitly under a warning and
/// carrying a hurricane watch for the northwestern Bahamas.
pub(crate) fn fixture_advisory_hurricane_watch() -> &'static str {
    "BULLETIN\n\
Tropical Storm Imelda Advisory Number 8A\n\
NWS National Hurricane Center Miami FL       AL092025\n\
\n\
SUMMARY OF WATCHES AND WARNINGS IN EFFECT:\n\
\n\
A Hurricane Watch is in effect for...\n\
* Northwestern Bahamas\n\
\n\
A Tropical Storm Warning is in effect for...\n\
* Northwestern Bahamas including New Providence\n\
* Andros Island\n\
\n\
A Hurricane Watch means that hurricane conditions are possible\n\
within the watch area.\n"
}

/// Advisory for a storm that does not concern the Bahamas.
pub(crate) fn fixture_advisory_unrelated() -> &'static str {
    "BULLETIN\n\
Hurricane Humberto Advisory Number 15\n\
NWS National Hurricane Center Miami FL       AL082025\n\
\n\
SUMMARY OF WATCHES AND WARNINGS IN EFFECT:\n\
\n\
A Tropical Storm Watch is in effect for...\n\
* Bermuda\n"
}

/// Tropical Weather Outlook mentioning Bahamas watches.
pub(crate) fn fixture_outlook_bahamas() -> &'static str {
    "Tropical Weather Outlook\n\
NWS National Hurricane Center Miami FL\n\
800 AM EDT Sun Sep 28 2025\n\
\n\
Active Systems:\n\
The National Hurricane Center is issuing advisories on Tropical Storm\n\
Imelda, located over the northwestern Bahamas. A Tropical Storm Watch\n\
remains in effect for portions of the Bahamas including Nassau.\n"
}

/// Quiet outlook.
pub(crate) fn fixture_outlook_quiet() -> &'static str {
    "Tropical Weather Outlook\n\
NWS National Hurricane Center Miami FL\n\
\n\
Tropical cyclone formation is not expected during the next 7 days.\n"
}
