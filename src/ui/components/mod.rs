pub mod confirm_dialog;
pub mod menu;
pub mod question_list;
pub mod score_card;
pub mod speaking_panel;
pub mod timer_bar;
pub mod writing_panel;
