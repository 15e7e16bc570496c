//! Document-tree abstraction over a rendered page.
//!
//! A [`DocumentTree`] is the narrow view the discovery engine needs of a live
//! page: CSS queries, text and attribute reads, geometry, and the two
//! interactions used during expansion (scroll-into-view and activation).
//! Browser automation layers implement it for real tabs; [`crate::SnapshotTree`]
//! implements it for saved HTML.

use std::fmt;

use async_trait::async_trait;

use classfetch_shared::Result;

/// Read and interaction access to a rendered document.
///
/// Queries never fail: an element that vanished simply stops matching, and a
/// missing attribute is `None`. Only the interactions report errors, since a
/// host may refuse to scroll or click a node that detached mid-call.
#[async_trait]
pub trait DocumentTree: Send + Sync {
    /// Opaque handle to one element. Handles may outlive the element itself.
    type Element: Clone + Send + Sync + fmt::Debug;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Descendants of `element` matching `selector`, in document order.
    async fn query_within(&self, element: &Self::Element, selector: &str) -> Vec<Self::Element>;

    /// The element's link target, resolved to an absolute URL when possible.
    async fn href(&self, element: &Self::Element) -> Option<String>;

    /// Rendered text, with line breaks between block-level children.
    async fn inner_text(&self, element: &Self::Element) -> String;

    /// Raw attribute value.
    async fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Whether the element is still connected to the document.
    async fn is_attached(&self, element: &Self::Element) -> bool;

    /// Whether layout produced a rendering box (not `display: none` etc.).
    async fn has_render_box(&self, element: &Self::Element) -> bool;

    /// Scroll the element into the viewport.
    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    /// Dispatch an activation (click) on the element.
    async fn activate(&self, element: &Self::Element) -> Result<()>;

    /// Attached and rendered.
    async fn is_visible(&self, element: &Self::Element) -> bool {
        self.is_attached(element).await && self.has_render_box(element).await
    }
}

/// Scroll an element into view and activate it.
pub(crate) async fn bring_into_view_and_activate<T>(tree: &T, element: &T::Element) -> Result<()>
where
    T: DocumentTree + ?Sized,
{
    tree.scroll_into_view(element).await?;
    tree.activate(element).await
}
