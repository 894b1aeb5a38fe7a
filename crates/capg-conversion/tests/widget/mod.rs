//! A minimal resource served in three versions, with `v1` as the hub.

use capg_conversion::{Adapter, Convertible, Dispatcher, Error, Hub, Result};

pub mod v1 {
    use kube::CustomResource;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, CustomResource, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[kube(group = "example.com", version = "v1", kind = "Widget")]
    pub struct WidgetSpec {
        pub size: i32,
        pub color: Option<String>,
    }
}

pub mod v1beta1 {
    use kube::CustomResource;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, CustomResource, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[kube(group = "example.com", version = "v1beta1", kind = "Widget")]
    pub struct WidgetSpec {
        pub size: i32,
    }
}

pub mod v1alpha1 {
    use kube::CustomResource;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, CustomResource, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[kube(group = "example.com", version = "v1alpha1", kind = "Widget")]
    pub struct WidgetSpec {
        pub size: String,
    }
}

impl Hub for v1::Widget {}

impl Convertible<v1::Widget> for v1beta1::Widget {
    fn to_hub(&self) -> Result<v1::Widget> {
        let mut widget = v1::Widget::new("", v1::WidgetSpec {
            size: self.spec.size,
            color: None,
        });
        widget.metadata = self.metadata.clone();
        Ok(widget)
    }

    fn from_hub(hub: &v1::Widget) -> Result<Self> {
        let mut widget = Self::new("", v1beta1::WidgetSpec {
            size: hub.spec.size,
        });
        widget.metadata = hub.metadata.clone();
        Ok(widget)
    }

    fn restore(hub: &mut v1::Widget, preserved: v1::Widget) {
        hub.spec.color = preserved.spec.color;
    }
}

impl Convertible<v1::Widget> for v1alpha1::Widget {
    fn to_hub(&self) -> Result<v1::Widget> {
        let size = self
            .spec
            .size
            .parse()
            .map_err(|_| Error::ConversionFailed {
                entity: "WidgetSpec",
                reason: format!("size {:?} is not a number", self.spec.size),
            })?;

        let mut widget = v1::Widget::new("", v1::WidgetSpec { size, color: None });
        widget.metadata = self.metadata.clone();
        Ok(widget)
    }

    fn from_hub(hub: &v1::Widget) -> Result<Self> {
        let mut widget = Self::new("", v1alpha1::WidgetSpec {
            size: hub.spec.size.to_string(),
        });
        widget.metadata = hub.metadata.clone();
        Ok(widget)
    }

    fn restore(hub: &mut v1::Widget, preserved: v1::Widget) {
        hub.spec.color = preserved.spec.color;
    }
}

pub fn dispatcher() -> Dispatcher<v1::Widget> {
    Dispatcher::builder(Adapter::new(Default::default()))
        .add_spoke::<v1alpha1::Widget>()
        .add_spoke::<v1beta1::Widget>()
        .build()
        .expect("versions are unique")
}
