use capg_conversion::{
    Adapter, Dispatcher, ErrorKind,
    api::{v1alpha3, v1alpha4},
};
use kube::core::{conversion::ConversionReview, response::StatusSummary};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

mod widget;

const V1ALPHA3: &str = "infrastructure.cluster.x-k8s.io/v1alpha3";
const V1ALPHA4: &str = "infrastructure.cluster.x-k8s.io/v1alpha4";

#[fixture]
fn dispatcher() -> Dispatcher<v1alpha4::GCPCluster> {
    Dispatcher::builder(Adapter::new(Default::default()))
        .add_spoke::<v1alpha3::GCPCluster>()
        .build()
        .expect("versions are unique")
}

fn cluster(api_version: &str) -> Value {
    json!({
        "apiVersion": api_version,
        "kind": "GCPCluster",
        "metadata": {
            "name": "capg",
            "namespace": "default",
            "uid": "5d4a7f0e-3c2b-4f6a-9d8e-1b2c3d4e5f60",
        },
        "spec": {
            "project": "my-project",
            "region": "us-central1",
            "network": {
                "subnets": [
                    { "name": "a", "cidrBlock": "10.0.0.0/24", "region": "us-central1", "purpose": "PRIVATE" },
                    { "name": "b", "cidrBlock": "10.0.1.0/24", "region": "us-central1", "purpose": "PRIVATE" },
                ],
            },
        },
    })
}

fn review(desired_api_version: &str, objects: Vec<Value>) -> ConversionReview {
    serde_json::from_value(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "ConversionReview",
        "request": {
            "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
            "desiredAPIVersion": desired_api_version,
            "objects": objects,
        },
    }))
    .expect("valid ConversionReview")
}

#[rstest]
fn round_trip_through_spoke(dispatcher: Dispatcher<v1alpha4::GCPCluster>) {
    let original = cluster(V1ALPHA4);

    let spoke = dispatcher
        .convert(original.clone(), V1ALPHA3)
        .expect("down-conversion");
    assert_eq!(spoke["apiVersion"], V1ALPHA3);
    assert_eq!(spoke["spec"]["network"]["subnets"][0].get("purpose"), None);

    let hub = dispatcher.convert(spoke, V1ALPHA4).expect("up-conversion");
    assert_eq!(hub["apiVersion"], V1ALPHA4);
    assert_eq!(hub["spec"]["network"]["subnets"][0]["purpose"], "PRIVATE");
    assert_eq!(hub["metadata"].get("annotations"), None);
}

#[rstest]
fn same_version_is_returned_unchanged(dispatcher: Dispatcher<v1alpha4::GCPCluster>) {
    let object = cluster(V1ALPHA3);
    let converted = dispatcher
        .convert(object.clone(), V1ALPHA3)
        .expect("noop conversion");

    assert_eq!(converted, object);
}

#[rstest]
#[case::null(Value::Null)]
#[case::array(json!([]))]
#[case::missing_kind(json!({ "apiVersion": V1ALPHA3 }))]
#[case::kind_not_a_string(json!({ "apiVersion": V1ALPHA3, "kind": 42 }))]
#[case::wrong_kind(json!({ "apiVersion": V1ALPHA3, "kind": "GCPMachine" }))]
#[case::wrong_group(json!({ "apiVersion": "example.com/v1alpha3", "kind": "GCPCluster" }))]
#[case::unknown_version(json!({ "apiVersion": "infrastructure.cluster.x-k8s.io/v1beta1", "kind": "GCPCluster" }))]
#[case::malformed_version(json!({ "apiVersion": "infrastructure.cluster.x-k8s.io/latest", "kind": "GCPCluster" }))]
#[case::malformed_spec(json!({ "apiVersion": V1ALPHA3, "kind": "GCPCluster", "metadata": {}, "spec": { "project": 1 } }))]
fn invalid_input(dispatcher: Dispatcher<v1alpha4::GCPCluster>, #[case] object: Value) {
    let err = dispatcher
        .convert(object, V1ALPHA4)
        .expect_err("object is invalid");

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.http_status_code(), 400);
}

#[rstest]
fn review_success_echoes_uid(dispatcher: Dispatcher<v1alpha4::GCPCluster>) {
    let review = dispatcher.handle(review(V1ALPHA3, vec![
        cluster(V1ALPHA4),
        cluster(V1ALPHA4),
    ]));

    let response = review.response.expect("review has a response");
    assert_eq!(response.result.status, Some(StatusSummary::Success));
    assert_eq!(response.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
    assert_eq!(response.converted_objects.len(), 2);
    assert!(
        response
            .converted_objects
            .iter()
            .all(|object| object["apiVersion"] == V1ALPHA3)
    );
}

#[rstest]
fn review_failure_returns_no_objects(dispatcher: Dispatcher<v1alpha4::GCPCluster>) {
    let mut broken = cluster(V1ALPHA4);
    broken["spec"]["network"]["subnets"][1]["secondaryCidrBlocks"] = json!([
        { "rangeName": "pods", "ipCidrRange": "10.4.0.0/14" },
        { "rangeName": "pods", "ipCidrRange": "10.8.0.0/14" },
    ]);

    let review = dispatcher.handle(review(V1ALPHA3, vec![cluster(V1ALPHA4), broken]));

    let response = review.response.expect("review has a response");
    assert_eq!(response.result.status, Some(StatusSummary::Failure));
    assert_eq!(response.result.code, 500);
    assert_eq!(response.result.reason, "ConversionFailed");
    assert_eq!(response.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
    assert!(response.converted_objects.is_empty());
    assert!(
        response
            .result
            .message
            .starts_with("failed to convert element 1 of objects")
    );
}

#[rstest]
fn review_without_request_is_rejected(dispatcher: Dispatcher<v1alpha4::GCPCluster>) {
    let review: ConversionReview = serde_json::from_value(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "ConversionReview",
    }))
    .expect("valid ConversionReview");

    let review = dispatcher.handle(review);
    let response = review.response.expect("review has a response");
    assert_eq!(response.result.status, Some(StatusSummary::Failure));
    assert_eq!(response.result.code, 400);
}

#[test]
fn spokes_convert_through_hub() {
    let dispatcher = widget::dispatcher();

    let converted = dispatcher
        .convert(
            json!({
                "apiVersion": "example.com/v1alpha1",
                "kind": "Widget",
                "metadata": { "name": "gear" },
                "spec": { "size": "3" },
            }),
            "example.com/v1beta1",
        )
        .expect("spoke to spoke");

    assert_eq!(converted["apiVersion"], "example.com/v1beta1");
    assert_eq!(converted["spec"]["size"], 3);
}

#[test]
fn hub_only_fields_survive_spoke_to_spoke_hops() {
    let dispatcher = widget::dispatcher();
    let original = json!({
        "apiVersion": "example.com/v1",
        "kind": "Widget",
        "metadata": { "name": "gear", "namespace": "default" },
        "spec": { "size": 3, "color": "teal" },
    });

    let beta = dispatcher
        .convert(original.clone(), "example.com/v1beta1")
        .expect("hub to v1beta1");
    assert_eq!(beta["spec"].get("color"), None);

    // v1beta1 restores the color from its payload before v1alpha1 preserves it again
    let alpha = dispatcher
        .convert(beta, "example.com/v1alpha1")
        .expect("v1beta1 to v1alpha1");
    assert_eq!(alpha["spec"]["size"], "3");

    let hub = dispatcher
        .convert(alpha, "example.com/v1")
        .expect("v1alpha1 to hub");
    assert_eq!(hub["spec"]["color"], "teal");
    assert_eq!(hub, original);
}

#[test]
fn spoke_errors_keep_their_kind() {
    let dispatcher = widget::dispatcher();

    let err = dispatcher
        .convert_objects(
            vec![json!({
                "apiVersion": "example.com/v1alpha1",
                "kind": "Widget",
                "metadata": { "name": "gear" },
                "spec": { "size": "huge" },
            })],
            "example.com/v1",
        )
        .expect_err("size is not a number");

    assert_eq!(err.kind(), ErrorKind::ConversionFailed);
}

#[test]
fn duplicate_spokes_are_rejected() {
    let result = Dispatcher::<widget::v1::Widget>::builder(Adapter::new(Default::default()))
        .add_spoke::<widget::v1alpha1::Widget>()
        .add_spoke::<widget::v1alpha1::Widget>()
        .build();

    let err = result.err().expect("v1alpha1 is registered twice");
    assert_eq!(
        err.join_errors(),
        "invalid set of registered versions: version v1alpha1 is declared more than once"
    );
}
