use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Ask the shell to synthesize a client-side download: save the content
/// behind `source` (a URL or data reference) under `file_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveFileOperation {
    pub file_name: String,
    pub source: String,
}

impl Operation for SaveFileOperation {
    type Output = ();
}

#[derive(Clone)]
pub struct FileSaver<Ev> {
    context: CapabilityContext<SaveFileOperation, Ev>,
}

impl<Ev> Capability<Ev> for FileSaver<Ev> {
    type Operation = SaveFileOperation;
    type MappedSelf<MappedEv> = FileSaver<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        FileSaver::new(self.context.map_event(f))
    }
}

impl<Ev> FileSaver<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<SaveFileOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn save(&self, file_name: String, source: String) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(SaveFileOperation { file_name, source }).await;
        });
    }
}

pub type FileSaverCapability = FileSaver<Event>;
