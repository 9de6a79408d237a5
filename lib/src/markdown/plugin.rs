use pulldown_cmark::Event;

/// A stage in the markdown pipeline that remaps the parser's event stream
/// before HTML rendering.
pub trait Plugin {
    #[inline(always)]
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        events
    }
}
