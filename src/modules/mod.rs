// Module exports for tab, view and navigation logic
pub mod coordinator;   // Rebinds shared panels on active-tab change
pub mod document;      // Document collaborator seam
pub mod model;         // Observable list-model plumbing
pub mod navigation;    // Locations, input resolution, previews
pub mod outline;       // Page heading tree
pub mod shortcuts;     // Key sequence -> action map
pub mod tabs;          // Tab and tab-strip containers
pub mod views;         // History and outline panels
