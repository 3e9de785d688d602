pub struct TileResponse {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
