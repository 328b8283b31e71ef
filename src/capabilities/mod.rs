pub mod http;
mod save;
mod scroll;
mod timer;

pub use self::http::{
    EndpointError, MultipartForm, TransportError, TransportResponse, TransportResult,
    UploadEndpoint, UploadResponse, FIELD_IMAGE, FIELD_STYLE, UPLOAD_PATH,
};
pub use self::save::{FileSaver, SaveFileOperation};
pub use self::scroll::{Scroll, ScrollAlign, ScrollOperation, ScrollTarget};
pub use self::timer::{Timer, TimerOperation};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::event::Event;

pub type AppRender = Render<Event>;
pub type AppHttp = Http<Event>;
pub type AppTimer = Timer<Event>;
pub type AppScroll = Scroll<Event>;
pub type AppFileSaver = FileSaver<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub timer: Timer<Event>,
    pub scroll: Scroll<Event>,
    pub file_saver: FileSaver<Event>,
}
