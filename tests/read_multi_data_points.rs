extern crate chrono;
extern crate chrono_tz;
extern crate tempodb;

mod util;

mod integration {
    mod read_multi_data_points {
        use chrono::{TimeZone, Utc};
        use chrono_tz::America::Chicago;
        use chrono_tz::Tz;
        use std::collections::BTreeSet;
        use tempodb::{Client, CursorState, Error, Filter, Fold, Interpolation, Interval, Method,
                      MultiDataPoint, Period, Rollup};
        use util::{ok_json, MockTransport};

        const PAGE: &str = r#"{
            "tz": "UTC",
            "data": [
                {"t": "2012-01-01T00:00:00.000+0000", "v": {"key1": 1.0, "key2": 2.0}},
                {"t": "2012-01-01T00:01:00.000+0000", "v": {"key1": 3.0, "key2": null}}
            ]
        }"#;

        fn interval() -> Interval {
            Interval::new(
                Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap(),
            ).unwrap()
        }

        fn param_names(transport: &MockTransport) -> BTreeSet<(String, String)> {
            transport.request(0).params.iter().cloned().collect()
        }

        fn pairs(raw: &[(&str, &str)]) -> BTreeSet<(String, String)> {
            raw.iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }

        #[test]
        fn test_smoke() {
            let client = Client::new(MockTransport::new().respond(ok_json(PAGE)));
            let filter = Filter::new().add_key("key1").add_key("key2");
            let points: Vec<MultiDataPoint> = client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, None, None)
                .collect::<Result<_, _>>()
                .unwrap();

            assert_eq!(2, points.len());
            assert_eq!(Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(), points[0].timestamp);
            assert_eq!(Some(1.0), points[0].get("key1"));
            assert_eq!(Some(2.0), points[0].get("key2"));
            assert_eq!(Some(3.0), points[1].get("key1"));
            assert_eq!(None, points[1].get("key2"));

            let sent = client.transport().request(0);
            assert_eq!(Method::Get, sent.method);
            assert_eq!("/v1/multi/", sent.path);
        }

        #[test]
        fn test_exact_params() {
            let client = Client::new(MockTransport::new().respond(ok_json(PAGE)));
            let filter = Filter::new().add_key("key1");
            client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, None, None)
                .count();

            assert_eq!(4, client.transport().request(0).params.len());
            assert_eq!(
                pairs(&[
                    ("key", "key1"),
                    ("start", "2012-01-01T00:00:00.000+0000"),
                    ("end", "2012-01-02T00:00:00.000+0000"),
                    ("tz", "UTC"),
                ]),
                param_names(client.transport())
            );
        }

        #[test]
        fn test_rollup_and_interpolation_params() {
            let transport = MockTransport::new()
                .respond(ok_json(PAGE))
                .respond(ok_json(PAGE))
                .respond(ok_json(PAGE));
            let client = Client::new(transport);
            let filter = Filter::new().add_key("key1");
            let rollup = Rollup::new(Period::minutes(1), Fold::Sum);
            let interpolation = Interpolation::linear(Period::minutes(1));

            client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, Some(&rollup), None)
                .count();
            client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, Some(&rollup), Some(&interpolation))
                .count();
            client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, None, Some(&interpolation))
                .count();

            let first = client.transport().request(0).params;
            assert_eq!(6, first.len());
            assert_eq!(Some("PT1M"), first.get("rollup.period"));
            assert_eq!(Some("sum"), first.get("rollup.fold"));
            assert_eq!(None, first.get("interpolation.period"));

            let second = client.transport().request(1).params;
            assert_eq!(8, second.len());
            assert_eq!(Some("PT1M"), second.get("interpolation.period"));
            assert_eq!(Some("linear"), second.get("interpolation.function"));

            let third = client.transport().request(2).params;
            assert_eq!(6, third.len());
            assert_eq!(None, third.get("rollup.fold"));
        }

        #[test]
        fn test_tags_and_attributes() {
            let client = Client::new(MockTransport::new().respond(ok_json(PAGE)));
            let filter = Filter::new()
                .add_tag("tag1")
                .add_tag("tag1")
                .add_attribute("host", "web01");
            client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, None, None)
                .count();

            let params = client.transport().request(0).params;
            assert_eq!(5, params.len());
            assert_eq!(vec!["tag1"], params.get_all("tag").collect::<Vec<_>>());
            assert_eq!(Some("web01"), params.get("attr[host]"));
        }

        #[test]
        fn test_timezone() {
            let body = r#"{
                "tz": "America/Chicago",
                "data": [{"t": "2012-01-01T00:00:00.000-06:00", "v": {"key1": 5.0}}]
            }"#;
            let client = Client::new(MockTransport::new().respond(ok_json(body)));
            let filter = Filter::new().add_key("key1");
            let points: Vec<MultiDataPoint> = client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, None, None)
                .collect::<Result<_, _>>()
                .unwrap();

            assert_eq!(Utc.with_ymd_and_hms(2012, 1, 1, 6, 0, 0).unwrap(), points[0].timestamp);
            assert_eq!(Tz::UTC, points[0].timestamp.timezone());
        }

        #[test]
        fn test_bounds_in_requested_zone() {
            let client = Client::new(MockTransport::new().respond(ok_json(PAGE)));
            let filter = Filter::new().add_key("key1");
            let interval = Interval::new(
                Chicago.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
                Chicago.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap(),
            ).unwrap();
            client
                .read_multi_data_points(&filter, &interval, Tz::America__Chicago, None, None)
                .count();

            let params = client.transport().request(0).params;
            assert_eq!(Some("2012-01-01T00:00:00.000-0600"), params.get("start"));
            assert_eq!(Some("2012-01-02T00:00:00.000-0600"), params.get("end"));
            assert_eq!(Some("America/Chicago"), params.get("tz"));
        }

        #[test]
        fn test_multiple_pages() {
            let first = r#"{"tz": "UTC", "data": [
                {"t": "2012-03-27T05:00:00.000+0000", "v": {"key1": 1.0}},
                {"t": "2012-03-27T05:01:00.000+0000", "v": {"key1": 2.0}}
            ]}"#;
            let second = r#"{"tz": "UTC", "data": [
                {"t": "2012-03-27T05:02:00.000+0000", "v": {"key1": 3.0}}
            ]}"#;
            let link = "</v1/multi/?key=key1&start=2012-03-27T05%3A02%3A00.000%2B0000\
                        &end=2012-03-28T00%3A00%3A00.000%2B0000&tz=UTC>; rel=\"next\"";
            let transport = MockTransport::new()
                .respond(ok_json(first).header("Link", link))
                .respond(ok_json(second));
            let client = Client::new(transport);
            let filter = Filter::new().add_key("key1");
            let interval = Interval::new(
                Utc.with_ymd_and_hms(2012, 3, 27, 5, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2012, 3, 28, 0, 0, 0).unwrap(),
            ).unwrap();

            let values: Vec<f64> = client
                .read_multi_data_points(&filter, &interval, Tz::UTC, None, None)
                .map(|p| p.unwrap().get("key1").unwrap())
                .collect();
            assert_eq!(vec![1.0, 2.0, 3.0], values);

            let transport = client.transport();
            assert_eq!(2, transport.requests());
            let page2 = transport.request(1);
            assert_eq!("/v1/multi/", page2.path);
            assert_eq!(Some("2012-03-27T05:02:00.000+0000"), page2.params.get("start"));
            assert_eq!(Some("key1"), page2.params.get("key"));
            assert_eq!(transport.request(0).params.get("end"), page2.params.get("end"));
        }

        #[test]
        fn test_laziness() {
            let client = Client::new(MockTransport::new().respond(ok_json(PAGE)));
            let filter = Filter::new().add_key("key1");
            let mut cursor = client.read_multi_data_points(&filter, &interval(), Tz::UTC, None, None);

            assert_eq!(CursorState::NotStarted, cursor.state());
            assert_eq!(0, client.transport().requests());
            assert!(cursor.next().is_some());
            assert_eq!(1, client.transport().requests());
            assert_eq!(CursorState::HasBuffered, cursor.state());
        }

        #[test]
        fn test_deferred_error() {
            let transport = MockTransport::new()
                .respond(tempodb::Response::new(403, "You are forbidden"));
            let client = Client::new(transport);
            let filter = Filter::new().add_key("key1");
            let mut cursor = client.read_multi_data_points(&filter, &interval(), Tz::UTC, None, None);
            assert_eq!(0, client.transport().requests());

            match cursor.advance() {
                Err(Error::Protocol { status, message }) => {
                    assert_eq!(403, status);
                    assert_eq!("You are forbidden", message);
                }
                other => panic!("unexpected {:?}", other),
            }
            assert_eq!(CursorState::Errored, cursor.state());
            // the error sticks, no further requests
            assert!(cursor.advance().is_err());
            assert_eq!(1, client.transport().requests());
        }

        #[test]
        fn test_transport_error_surfaces_once() {
            let transport = MockTransport::new().fail(Error::Transport("connection refused".into()));
            let client = Client::new(transport);
            let filter = Filter::new().add_key("key1");
            let results: Vec<_> = client
                .read_multi_data_points(&filter, &interval(), Tz::UTC, None, None)
                .collect();
            assert_eq!(1, results.len());
            assert_eq!(Err(Error::Transport("connection refused".into())), results[0]);
        }

        #[test]
        fn test_idempotent_reread() {
            let transport = MockTransport::new()
                .respond(ok_json(PAGE))
                .respond(ok_json(PAGE));
            let client = Client::new(transport);
            let filter = Filter::new().add_key("key1").add_key("key2");

            let read = || -> Vec<MultiDataPoint> {
                client
                    .read_multi_data_points(&filter, &interval(), Tz::UTC, None, None)
                    .collect::<Result<_, _>>()
                    .unwrap()
            };
            let first = read();
            let second = read();
            assert_eq!(first, second);
            assert_eq!(
                client.transport().request(0),
                client.transport().request(1)
            );
        }
    }
}
