use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::event::Event;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTarget {
    UploadArea,
    Results,
    /// A same-page anchor, by element id (no leading `#`).
    Anchor(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    Center,
    Nearest,
}

/// Ask the shell to smooth-scroll a target into view. Fire-and-forget, like
/// render: the core never needs to know whether the scroll happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrollOperation {
    pub target: ScrollTarget,
    pub align: ScrollAlign,
}

impl Operation for ScrollOperation {
    type Output = ();
}

#[derive(Clone)]
pub struct Scroll<Ev> {
    context: CapabilityContext<ScrollOperation, Ev>,
}

impl<Ev> Capability<Ev> for Scroll<Ev> {
    type Operation = ScrollOperation;
    type MappedSelf<MappedEv> = Scroll<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Scroll::new(self.context.map_event(f))
    }
}

impl<Ev> Scroll<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<ScrollOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn scroll_to(&self, target: ScrollTarget, align: ScrollAlign) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(ScrollOperation { target, align }).await;
        });
    }
}

pub type ScrollCapability = Scroll<Event>;
